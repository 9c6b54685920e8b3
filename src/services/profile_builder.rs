// src/services/profile_builder.rs
//! Assembly of signed verifiable profiles.
//!
//! Builds, per request, a cryptographic key credential from a profile's
//! public key, signs it, embeds it in a profile-shaped document, and
//! optionally signs the whole document a second time (a doubly verifiable
//! profile). Nothing built here is persisted.

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::errors::{MediationError, Result};
use crate::models::credential::{CryptoKeyCredential, EmbeddedCredential, VerifiableProfile};
use crate::models::profile::{JsonLdContext, KeyRecord, Profile};
use crate::services::signer::{CredentialSigner, SignRequest};

/// Options for building one verifiable profile.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions<'a> {
    /// The stored profile to expose.
    pub profile: &'a Profile,
    /// Audience origin the signatures are scoped to.
    pub domain: &'a str,
    /// Whether to apply the outer profile-level signature.
    pub sign: bool,
}

/// Builder for signed verifiable profiles.
pub struct VerifiableProfileBuilder {
    signer: Arc<CredentialSigner>,
}

impl VerifiableProfileBuilder {
    /// Creates a builder signing through `signer`.
    pub fn new(signer: Arc<CredentialSigner>) -> Self {
        VerifiableProfileBuilder { signer }
    }

    /// Builds the verifiable profile document.
    ///
    /// # Process Flow
    /// 1. Extract the profile's signing key
    /// 2. Wrap its public half in a cryptographic key credential
    /// 3. Sign the credential with the key's suite and the given domain
    /// 4. Embed the signed credential in an unsigned profile document
    /// 5. Outer-sign that document when `sign` is requested
    ///
    /// # Errors
    /// * `MediationError::ProfileIncomplete` when no public key is reachable
    /// * `MediationError::Signing` when the key is unusable or a suite fails
    pub async fn build(&self, options: BuildOptions<'_>) -> Result<Value> {
        let profile = options.profile;
        let key = profile
            .signing_key()
            .ok_or(MediationError::ProfileIncomplete)?;
        let private_key = key.private_key().ok_or_else(|| {
            MediationError::Signing("profile key is missing its private half".to_string())
        })?;
        let context = context_for(key);

        let credential =
            CryptoKeyCredential::for_profile_key(&profile.id, key, context.clone());
        let credential_doc = serde_json::to_value(&credential)?;
        let signed_credential = self
            .signer
            .sign(SignRequest {
                algorithm: key.suite(),
                public_key_id: key.id(),
                private_key,
                document: &credential_doc,
                domain: Some(options.domain),
            })
            .await?;

        let unsigned_profile = serde_json::to_value(&VerifiableProfile {
            context,
            id: profile.id.clone(),
            credential: vec![EmbeddedCredential {
                graph: signed_credential,
            }],
        })?;

        if !options.sign {
            return Ok(unsigned_profile);
        }

        debug!("signing verifiable profile {} for {}", profile.id, options.domain);
        self.signer
            .sign(SignRequest {
                algorithm: key.suite(),
                public_key_id: key.id(),
                private_key,
                document: &unsigned_profile,
                domain: Some(options.domain),
            })
            .await
    }
}

/// The vocabulary context matching the key scheme: legacy keys keep the
/// identity context alone, Ed25519 keys emit identity and security together.
fn context_for(key: &KeyRecord) -> JsonLdContext {
    match key {
        KeyRecord::Pem { .. } => JsonLdContext::identity(),
        KeyRecord::Ed25519 { .. } => JsonLdContext::identity_with_security(),
    }
}
