// src/crypto/suite.rs
//! Signature suite identifiers and the document-signing collaborator.
//!
//! The signing primitive is injected wherever it is needed; nothing in the
//! crate registers helpers into process-wide state. A suite implementation
//! wraps a document in the detached-signature envelope its algorithm
//! requires and can verify one it produced.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::errors::Result;
use crate::models::profile::KeyRecord;

/// Identifier of a signature suite.
///
/// Each key record type maps to exactly one suite; see
/// [`KeyRecord::suite`](crate::models::profile::KeyRecord::suite).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptoSuite {
    /// RSA over PEM keys, used by legacy `CryptographicKey` records.
    LinkedDataSignature2015,
    /// Ed25519 over base58 keys, used by `Ed25519VerificationKey2018`
    /// records.
    Ed25519Signature2018,
}

impl CryptoSuite {
    /// Suite identifier as it appears in signature documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoSuite::LinkedDataSignature2015 => "LinkedDataSignature2015",
            CryptoSuite::Ed25519Signature2018 => "Ed25519Signature2018",
        }
    }
}

impl fmt::Display for CryptoSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one detached-signature operation.
///
/// `creator` names the verification key the signature is attributed to.
/// `domain` scopes the signature to its intended audience; a signature with
/// an omitted or different domain is a distinct signature.
#[derive(Debug, Clone)]
pub struct ProofOptions<'a> {
    /// Verification key reference (`creator` in the signature document).
    pub creator: &'a str,
    /// Private key in the suite's encoding.
    pub private_key: &'a str,
    /// Intended audience origin, if any.
    pub domain: Option<&'a str>,
}

/// A detached-signature suite.
///
/// Implementations must not retry a failed signing operation; signing is
/// not safe to repeat blindly against a mutable document.
#[async_trait]
pub trait SignatureSuite: Send + Sync {
    /// The suite this implementation provides.
    fn id(&self) -> CryptoSuite;

    /// Wraps `document` in this suite's signature envelope.
    ///
    /// # Errors
    /// Returns `MediationError::Signing` if the private key is malformed or
    /// the document cannot be signed.
    async fn sign(&self, document: &Value, options: &ProofOptions<'_>) -> Result<Value>;

    /// Verifies a document signed by this suite against a key record's
    /// public half.
    ///
    /// # Returns
    /// `Ok(true)` when the signature is present and valid for the key,
    /// `Ok(false)` when it is present but does not verify.
    async fn verify(&self, document: &Value, public_key: &KeyRecord) -> Result<bool>;
}
