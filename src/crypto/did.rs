// src/crypto/did.rs
//! DID document generation.
//!
//! [`DidGenerator`] is the collaborator interface for minting a private DID
//! document: a profile-shaped document whose authentication keys still carry
//! their private halves. [`Ed25519DidGenerator`] is the in-tree
//! implementation for Ed25519 keys; it derives nym identifiers from a
//! multicodec fingerprint of the public key.

use async_trait::async_trait;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::errors::{MediationError, Result};
use crate::models::profile::{AuthenticationBinding, JsonLdContext, KeyRecord, Profile};

/// Multicodec prefix identifying an Ed25519 public key in a fingerprint.
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Deployment environment the generated identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DidEnv {
    /// Development ledger. Identifiers use the test namespace.
    Dev,
    /// Test ledger.
    Test,
    /// Production ledger.
    Live,
}

impl Default for DidEnv {
    fn default() -> Self {
        DidEnv::Dev
    }
}

/// How the method-specific identifier is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DidType {
    /// Cryptonym: derived from the authentication key fingerprint.
    Nym,
    /// Random uuid identifier.
    Uuid,
}

/// Key algorithm for the generated authentication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Ed25519, recorded as `Ed25519VerificationKey2018`.
    Ed25519,
}

/// Options for one DID generation call.
#[derive(Debug, Clone)]
pub struct DidGenerationOptions {
    /// Display name to tag the document with.
    pub name: Option<String>,
    /// Identifier derivation.
    pub did_type: DidType,
    /// Authentication key algorithm.
    pub key_type: KeyType,
    /// Passphrase for private key encryption, if the generator supports it.
    pub passphrase: Option<String>,
    /// Target environment.
    pub env: DidEnv,
}

impl DidGenerationOptions {
    /// Standard options: a nym identifier with an Ed25519 key.
    pub fn nym(env: DidEnv) -> Self {
        DidGenerationOptions {
            name: None,
            did_type: DidType::Nym,
            key_type: KeyType::Ed25519,
            passphrase: None,
            env,
        }
    }
}

/// The DID generation primitive.
///
/// Generation is asynchronous and may be slow; callers must not block other
/// work on it.
#[async_trait]
pub trait DidGenerator: Send + Sync {
    /// Generates a private DID document.
    ///
    /// # Errors
    /// Returns `MediationError::KeyGeneration` when key material cannot be
    /// produced or an option is unsupported.
    async fn generate(&self, options: &DidGenerationOptions) -> Result<Profile>;
}

/// In-tree generator for Ed25519-keyed DID documents.
pub struct Ed25519DidGenerator;

impl Ed25519DidGenerator {
    /// Creates the generator.
    pub fn new() -> Self {
        Ed25519DidGenerator
    }

    /// Multibase fingerprint of an Ed25519 public key: `z` followed by the
    /// base58 encoding of the multicodec-prefixed key bytes.
    fn fingerprint(public_key: &[u8; 32]) -> String {
        let mut bytes = Vec::with_capacity(34);
        bytes.extend_from_slice(&ED25519_MULTICODEC);
        bytes.extend_from_slice(public_key);
        format!("z{}", bs58::encode(bytes).into_string())
    }

    fn did_for(options: &DidGenerationOptions, public_key: &[u8; 32]) -> String {
        let namespace = match options.env {
            DidEnv::Live => "",
            DidEnv::Dev | DidEnv::Test => "test:",
        };
        match options.did_type {
            DidType::Nym => format!("did:v1:{}nym:{}", namespace, Self::fingerprint(public_key)),
            DidType::Uuid => format!("did:v1:{}uuid:{}", namespace, Uuid::new_v4()),
        }
    }
}

impl Default for Ed25519DidGenerator {
    fn default() -> Self {
        Ed25519DidGenerator::new()
    }
}

#[async_trait]
impl DidGenerator for Ed25519DidGenerator {
    async fn generate(&self, options: &DidGenerationOptions) -> Result<Profile> {
        if options.passphrase.is_some() {
            return Err(MediationError::KeyGeneration(
                "passphrase-protected key storage is not supported".to_string(),
            ));
        }
        let KeyType::Ed25519 = options.key_type;

        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key = signing_key.verifying_key().to_bytes();
        let did = Self::did_for(options, &public_key);

        // Private halves are stored as the 64-byte seed-and-public
        // concatenation used by historical Ed25519 key encodings.
        let mut private_bytes = signing_key.to_bytes().to_vec();
        private_bytes.extend_from_slice(&public_key);

        let key = KeyRecord::Ed25519 {
            id: format!("{}#authn-key-1", did),
            owner: did.clone(),
            public_key_base58: bs58::encode(public_key).into_string(),
            private_key_base58: Some(bs58::encode(private_bytes).into_string()),
        };

        Ok(Profile {
            context: JsonLdContext::identity_with_security(),
            id: did,
            label: None,
            name: options.name.clone(),
            public_key: None,
            authentication: Some(vec![AuthenticationBinding {
                binding_type: "Ed25519SignatureAuthentication2018".to_string(),
                public_key: vec![key],
            }]),
        })
    }
}
