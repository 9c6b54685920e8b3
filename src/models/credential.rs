// src/models/credential.rs
//! Ephemeral credential documents built per signing request.
//!
//! A [`CryptoKeyCredential`] wraps the public half of a profile's key record
//! in a claim bound to the profile id. It is created for a single response
//! and never persisted. The signed credential is embedded into a
//! [`VerifiableProfile`] under `credential[0]["@graph"]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::profile::{JsonLdContext, KeyRecord};

/// Claim subject of a crypto key credential: the profile id plus the public
/// key being attested.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyClaim {
    /// The profile id the key belongs to.
    pub id: String,
    /// The public half of the key record. Never carries private material.
    #[serde(rename = "publicKey")]
    pub public_key: KeyRecord,
}

/// An unsigned cryptographic key credential.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CryptoKeyCredential {
    /// Vocabulary context, matching the key scheme in effect.
    #[serde(rename = "@context")]
    pub context: JsonLdContext,
    /// Generated ephemeral credential id.
    pub id: String,
    /// Credential type tags.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// The claim being attested.
    pub claim: KeyClaim,
}

impl CryptoKeyCredential {
    /// Builds the credential for a profile's key.
    ///
    /// The embedded record is reduced to its public half; the credential id
    /// is freshly generated per call.
    pub fn for_profile_key(profile_id: &str, key: &KeyRecord, context: JsonLdContext) -> Self {
        CryptoKeyCredential {
            context,
            id: format!("urn:ephemeral:{}", Uuid::new_v4()),
            types: vec![
                "Credential".to_string(),
                "CryptographicKeyCredential".to_string(),
            ],
            claim: KeyClaim {
                id: profile_id.to_string(),
                public_key: key.public_half(),
            },
        }
    }
}

/// A credential embedded in a profile as a named graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmbeddedCredential {
    /// The signed credential document.
    #[serde(rename = "@graph")]
    pub graph: Value,
}

/// A profile-shaped document carrying embedded verifiable credentials.
///
/// Built per request; not persisted. The outer signature, when requested,
/// is applied to the serialized form of this document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerifiableProfile {
    /// Vocabulary context, matching the key scheme in effect.
    #[serde(rename = "@context")]
    pub context: JsonLdContext,
    /// The profile id.
    pub id: String,
    /// Embedded credentials.
    pub credential: Vec<EmbeddedCredential>,
}
