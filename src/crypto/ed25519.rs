// src/crypto/ed25519.rs
//! Ed25519 detached-signature suite.
//!
//! Implements the `Ed25519Signature2018` envelope over base58-encoded keys:
//! the signing input is `sha256(header) || sha256(canonical document)`,
//! where the header binds the creation time, the creator key reference, and
//! the signature domain. The envelope is stored under the document's
//! top-level `signature` member.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::crypto::suite::{CryptoSuite, ProofOptions, SignatureSuite};
use crate::errors::{MediationError, Result};
use crate::models::profile::KeyRecord;

/// The in-tree `Ed25519Signature2018` suite.
pub struct Ed25519Suite;

impl Ed25519Suite {
    /// Creates the suite.
    pub fn new() -> Self {
        Ed25519Suite
    }

    fn signing_key_from_base58(encoded: &str) -> Result<SigningKey> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| MediationError::Signing(format!("invalid base58 private key: {}", e)))?;
        // Stored private halves are either the 32-byte seed or the 64-byte
        // seed-and-public concatenation.
        let seed: [u8; 32] = match bytes.len() {
            32 => bytes.as_slice().try_into().unwrap(),
            64 => bytes[..32].try_into().unwrap(),
            n => {
                return Err(MediationError::Signing(format!(
                    "invalid private key length: {} bytes",
                    n
                )))
            }
        };
        Ok(SigningKey::from_bytes(&seed))
    }

    fn verifying_key_from_record(key: &KeyRecord) -> Result<VerifyingKey> {
        let encoded = match key {
            KeyRecord::Ed25519 {
                public_key_base58, ..
            } => public_key_base58,
            KeyRecord::Pem { .. } => {
                return Err(MediationError::Signing(
                    "key type is not valid for the Ed25519Signature2018 suite".to_string(),
                ))
            }
        };
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| MediationError::Signing(format!("invalid base58 public key: {}", e)))?;
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            MediationError::Signing(format!("invalid public key length: {} bytes", bytes.len()))
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|e| MediationError::Signing(format!("invalid public key: {}", e)))
    }
}

impl Default for Ed25519Suite {
    fn default() -> Self {
        Ed25519Suite::new()
    }
}

#[async_trait]
impl SignatureSuite for Ed25519Suite {
    fn id(&self) -> CryptoSuite {
        CryptoSuite::Ed25519Signature2018
    }

    async fn sign(&self, document: &Value, options: &ProofOptions<'_>) -> Result<Value> {
        if !document.is_object() {
            return Err(MediationError::Signing(
                "document to sign must be a JSON object".to_string(),
            ));
        }
        let signing_key = Self::signing_key_from_base58(options.private_key)?;

        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let payload = signing_payload(document, &created, options.creator, options.domain);
        let signature = signing_key.sign(&payload);

        let mut envelope = serde_json::Map::new();
        envelope.insert("type".to_string(), json!(self.id().as_str()));
        envelope.insert("created".to_string(), json!(created));
        envelope.insert("creator".to_string(), json!(options.creator));
        if let Some(domain) = options.domain {
            envelope.insert("domain".to_string(), json!(domain));
        }
        envelope.insert(
            "signatureValue".to_string(),
            json!(base64::encode(signature.to_bytes())),
        );

        let mut signed = document.clone();
        signed
            .as_object_mut()
            .expect("checked above")
            .insert("signature".to_string(), Value::Object(envelope));
        Ok(signed)
    }

    async fn verify(&self, document: &Value, public_key: &KeyRecord) -> Result<bool> {
        let Some(envelope) = document.get("signature").and_then(Value::as_object) else {
            return Ok(false);
        };
        if envelope.get("type").and_then(Value::as_str) != Some(self.id().as_str()) {
            return Ok(false);
        }
        let (Some(created), Some(creator)) = (
            envelope.get("created").and_then(Value::as_str),
            envelope.get("creator").and_then(Value::as_str),
        ) else {
            return Ok(false);
        };
        let domain = envelope.get("domain").and_then(Value::as_str);
        let Some(encoded_signature) = envelope.get("signatureValue").and_then(Value::as_str) else {
            return Ok(false);
        };

        let signature_bytes = base64::decode(encoded_signature)
            .map_err(|e| MediationError::Signing(format!("invalid signature encoding: {}", e)))?;
        let Ok(signature) = Signature::from_slice(&signature_bytes) else {
            return Ok(false);
        };
        let verifying_key = Self::verifying_key_from_record(public_key)?;

        let payload = signing_payload(document, created, creator, domain);
        Ok(verifying_key.verify(&payload, &signature).is_ok())
    }
}

/// The detached signing input: the bound header and the document with its
/// top-level signature removed, each hashed separately.
fn signing_payload(document: &Value, created: &str, creator: &str, domain: Option<&str>) -> Vec<u8> {
    let mut unsigned = document.clone();
    if let Some(map) = unsigned.as_object_mut() {
        map.remove("signature");
    }
    let header = format!(
        "created:{}\ncreator:{}\ndomain:{}\n",
        created,
        creator,
        domain.unwrap_or("")
    );
    let mut payload = Vec::with_capacity(64);
    payload.extend_from_slice(&Sha256::digest(header.as_bytes()));
    payload.extend_from_slice(&Sha256::digest(
        crate::utils::canonical::canonical_json(&unsigned).as_bytes(),
    ));
    payload
}
