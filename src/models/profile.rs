// src/models/profile.rs
//! Profile and key record data model.
//!
//! A profile is a document bound to a decentralized identifier that carries
//! the key material the mediator signs with. Two layouts are in use across
//! the profile lifecycle:
//!
//! - the legacy layout keeps a single `publicKey` record directly on the
//!   profile and uses the identity vocabulary alone;
//! - the DID-document layout reaches its keys through the `authentication`
//!   relation and emits the identity and security vocabularies together.
//!
//! Key records are a single variant type tagged by the key `type` field, so
//! every consumer dispatches on the suite tag instead of probing document
//! shapes.

use serde::{Deserialize, Serialize};

use crate::crypto::suite::CryptoSuite;

/// JSON-LD context URI for the identity vocabulary.
pub const IDENTITY_CONTEXT: &str = "https://w3id.org/identity/v1";

/// JSON-LD context URI for the security vocabulary, added by the Ed25519
/// key scheme.
pub const SECURITY_CONTEXT: &str = "https://w3id.org/security/v2";

/// A `@context` value: either a single vocabulary URI or a list of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonLdContext {
    /// A single context URI.
    One(String),
    /// An ordered list of context URIs.
    Many(Vec<String>),
}

impl JsonLdContext {
    /// The identity vocabulary alone (legacy key scheme).
    pub fn identity() -> Self {
        JsonLdContext::One(IDENTITY_CONTEXT.to_string())
    }

    /// Identity and security vocabularies together (Ed25519 key scheme).
    /// Both must be emitted when the later scheme is active.
    pub fn identity_with_security() -> Self {
        JsonLdContext::Many(vec![
            IDENTITY_CONTEXT.to_string(),
            SECURITY_CONTEXT.to_string(),
        ])
    }
}

/// An asymmetric keypair reference held by a profile.
///
/// The variant is selected by the `type` tag, which doubles as the suite
/// identifier the key is valid for. The private half is present only while
/// the record sits in the local store; [`KeyRecord::public_half`] strips it
/// before the record is embedded in any outbound document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum KeyRecord {
    /// PEM-encoded RSA keypair from the legacy scheme. Signed with the
    /// `LinkedDataSignature2015` suite.
    #[serde(rename = "CryptographicKey")]
    Pem {
        /// Key identifier, namespaced under the owning profile id.
        id: String,
        /// Back-reference to the owning profile id. Relation only.
        owner: String,
        /// Public key in PEM encoding.
        #[serde(rename = "publicKeyPem")]
        public_key_pem: String,
        /// Private key in PEM encoding. Local store only.
        #[serde(rename = "privateKeyPem", skip_serializing_if = "Option::is_none")]
        private_key_pem: Option<String>,
    },
    /// Base58-encoded Ed25519 keypair from the DID scheme. Signed with the
    /// `Ed25519Signature2018` suite.
    #[serde(rename = "Ed25519VerificationKey2018")]
    Ed25519 {
        /// Key identifier, namespaced under the owning profile id.
        id: String,
        /// Back-reference to the owning profile id. Relation only.
        owner: String,
        /// Public key bytes in base58 encoding.
        #[serde(rename = "publicKeyBase58")]
        public_key_base58: String,
        /// Private key bytes in base58 encoding. Local store only.
        #[serde(rename = "privateKeyBase58", skip_serializing_if = "Option::is_none")]
        private_key_base58: Option<String>,
    },
}

impl KeyRecord {
    /// The key identifier.
    pub fn id(&self) -> &str {
        match self {
            KeyRecord::Pem { id, .. } | KeyRecord::Ed25519 { id, .. } => id,
        }
    }

    /// The owning profile id.
    pub fn owner(&self) -> &str {
        match self {
            KeyRecord::Pem { owner, .. } | KeyRecord::Ed25519 { owner, .. } => owner,
        }
    }

    /// The signature suite this key is valid for.
    pub fn suite(&self) -> CryptoSuite {
        match self {
            KeyRecord::Pem { .. } => CryptoSuite::LinkedDataSignature2015,
            KeyRecord::Ed25519 { .. } => CryptoSuite::Ed25519Signature2018,
        }
    }

    /// The private key encoding, if the record still carries it.
    pub fn private_key(&self) -> Option<&str> {
        match self {
            KeyRecord::Pem {
                private_key_pem, ..
            } => private_key_pem.as_deref(),
            KeyRecord::Ed25519 {
                private_key_base58, ..
            } => private_key_base58.as_deref(),
        }
    }

    /// A copy of this record with the private half removed.
    ///
    /// Outbound documents embed only this form; private key material never
    /// leaves the store boundary inside a document.
    pub fn public_half(&self) -> KeyRecord {
        let mut key = self.clone();
        match &mut key {
            KeyRecord::Pem {
                private_key_pem, ..
            } => *private_key_pem = None,
            KeyRecord::Ed25519 {
                private_key_base58, ..
            } => *private_key_base58 = None,
        }
        key
    }

    /// Rewrites the ownership references when a profile is re-homed under a
    /// caller-supplied id. The key id keeps its suffix under the new
    /// namespace.
    pub(crate) fn rebind_owner(&mut self, old_id: &str, new_id: &str) {
        let (id, owner) = match self {
            KeyRecord::Pem { id, owner, .. } => (id, owner),
            KeyRecord::Ed25519 { id, owner, .. } => (id, owner),
        };
        if let Some(suffix) = id.strip_prefix(old_id).map(str::to_string) {
            *id = format!("{}{}", new_id, suffix);
        }
        *owner = new_id.to_string();
    }
}

/// An entry in a DID document's `authentication` relation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationBinding {
    /// Authentication suite tag, such as `Ed25519SignatureAuthentication2018`.
    #[serde(rename = "type")]
    pub binding_type: String,
    /// Keys usable for this authentication suite.
    #[serde(rename = "publicKey", default, skip_serializing_if = "Vec::is_empty")]
    pub public_key: Vec<KeyRecord>,
}

/// A key-backed profile document.
///
/// The `id` is unique within a store instance and immutable after creation;
/// updates replace the whole document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Vocabulary context for the document.
    #[serde(rename = "@context")]
    pub context: JsonLdContext,

    /// The profile's decentralized identifier.
    pub id: String,

    /// Display label (legacy layout).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Display name (DID-document layout).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Directly attached key record (legacy layout).
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<KeyRecord>,

    /// Authentication relation holding key records (DID-document layout).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<AuthenticationBinding>>,
}

impl Profile {
    /// The key record to sign with: the directly attached record in the
    /// legacy layout, otherwise the first key reachable through the
    /// `authentication` relation.
    pub fn signing_key(&self) -> Option<&KeyRecord> {
        if let Some(key) = self.public_key.as_ref() {
            return Some(key);
        }
        self.authentication
            .as_ref()?
            .iter()
            .flat_map(|binding| binding.public_key.iter())
            .next()
    }
}
