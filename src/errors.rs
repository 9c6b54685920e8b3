// src/errors.rs
//! Error types for the credential mediator.
//!
//! Every component in the crate reports failures through [`MediationError`].
//! The profile store, signer, and builder never swallow errors; each failure
//! surfaces to the event router, which settles the originating event with it.

use thiserror::Error;

/// Errors surfaced by mediation components and their collaborators.
#[derive(Debug, Error)]
pub enum MediationError {
    /// Malformed argument, such as an empty handler URL or document id.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The host policy denied the requested capability.
    #[error("permission denied: {0}")]
    Permission(String),

    /// A declared operation that has no implementation yet.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The signature primitive rejected the key or document.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Key or DID generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// A profile carried no usable public key.
    #[error("profile has no usable public key")]
    ProfileIncomplete,

    /// Document serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage backend reported an I/O failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Opening or connecting to an isolated handler window failed.
    #[error("window error: {0}")]
    Window(String),

    /// The handler window did not become ready within the configured bound.
    #[error("timed out waiting for handler window")]
    WindowTimeout,

    /// The remote handler rejected a proxied event. The message is relayed
    /// without translation.
    #[error("remote handler error: {0}")]
    Remote(String),
}

/// Result type used throughout the mediator.
pub type Result<T> = std::result::Result<T, MediationError>;
