// src/lib.rs

//! # Credential Mediator
//!
//! Mediates "get credential" and "store credential" events on behalf of a
//! user agent. Each event is either answered immediately from a locally
//! held, cryptographically verifiable key-backed profile, or handed off to
//! an isolated handler window for interactive resolution.
//!
//! ## Architecture Overview
//! 1. **Wallet Layer**: profile store and factory for key-backed profiles
//! 2. **Services Layer**: credential signing, verifiable profile assembly,
//!    event routing, and handler registration
//! 3. **Storage Layer**: named key-value instances scoped per handler URL
//! 4. **Cryptography Layer**: signature suites and DID generation
//!
//! The host environment is reached exclusively through the capability
//! traits in [`host`]; collaborators are injected, never global.

pub mod crypto; // Signature suites and DID generation
pub mod errors; // Crate-wide error taxonomy
pub mod host; // Capability interfaces onto the embedding host
pub mod models; // Profile, credential, and event documents
pub mod services; // Signing, profile assembly, routing, registration
pub mod storage; // Key-value storage backends
pub mod utils; // Canonical JSON helper
pub mod wallet; // Profile custody

pub use crate::errors::{MediationError, Result};
pub use crate::models::event::{
    CredentialEvent, CredentialRequestEvent, CredentialStoreEvent, HandlerResponse,
};
pub use crate::models::profile::{KeyRecord, Profile};
pub use crate::services::event_router::CredentialEventRouter;
pub use crate::services::profile_builder::{BuildOptions, VerifiableProfileBuilder};
pub use crate::services::signer::{CredentialSigner, SignRequest};
pub use crate::wallet::profile_factory::{CreateProfileOptions, ProfileFactory};
pub use crate::wallet::profile_store::ProfileKeyStore;
