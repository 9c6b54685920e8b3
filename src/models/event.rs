// src/models/event.rs
//! Mediated credential events and their responses.
//!
//! The host delivers request and store events as a tagged union; the router
//! never touches a global environment object. Payload fields mirror the
//! host's dispatch contract: request options and origin for requests, the
//! credential being stored for store events, and an optional hint key naming
//! the locally stored profile the requester prefers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type string for credential request events.
pub const CREDENTIAL_REQUEST_EVENT: &str = "credentialrequest";

/// Event type string for credential store events.
pub const CREDENTIAL_STORE_EVENT: &str = "credentialstore";

/// A "get credential" event.
#[derive(Debug, Clone)]
pub struct CredentialRequestEvent {
    /// The requester's credential request options document.
    pub request_options: Value,
    /// Origin of the requesting party. Used as the signature domain on the
    /// fast path.
    pub origin: String,
    /// Identifier of the preferred local profile, if the requester named one.
    pub hint_key: Option<String>,
}

/// A "store credential" event.
#[derive(Debug, Clone)]
pub struct CredentialStoreEvent {
    /// The credential document to store.
    pub credential: Value,
    /// Origin of the storing party.
    pub origin: String,
    /// Identifier of the preferred local profile, if the storer named one.
    pub hint_key: Option<String>,
}

/// An inbound credential event.
#[derive(Debug, Clone)]
pub enum CredentialEvent {
    /// A request for a credential.
    Request(CredentialRequestEvent),
    /// A request to store a credential.
    Store(CredentialStoreEvent),
}

impl CredentialEvent {
    /// The host-level event type string. Also names the handler window path
    /// on the slow path.
    pub fn event_type(&self) -> &'static str {
        match self {
            CredentialEvent::Request(_) => CREDENTIAL_REQUEST_EVENT,
            CredentialEvent::Store(_) => CREDENTIAL_STORE_EVENT,
        }
    }

    /// The hint key carried by the event, if any.
    pub fn hint_key(&self) -> Option<&str> {
        match self {
            CredentialEvent::Request(event) => event.hint_key.as_deref(),
            CredentialEvent::Store(event) => event.hint_key.as_deref(),
        }
    }
}

/// The payload forwarded into an isolated handler window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProxiedEvent {
    /// Original event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Request options, present on request events.
    #[serde(
        rename = "credentialRequestOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_options: Option<Value>,
    /// Credential payload, present on store events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<Value>,
    /// Hint key named by the original event.
    #[serde(rename = "hintKey", skip_serializing_if = "Option::is_none")]
    pub hint_key: Option<String>,
}

impl ProxiedEvent {
    /// Builds the forwarded payload for an event.
    pub fn from_event(event: &CredentialEvent) -> Self {
        match event {
            CredentialEvent::Request(request) => ProxiedEvent {
                event_type: CREDENTIAL_REQUEST_EVENT.to_string(),
                request_options: Some(request.request_options.clone()),
                credential: None,
                hint_key: request.hint_key.clone(),
            },
            CredentialEvent::Store(store) => ProxiedEvent {
                event_type: CREDENTIAL_STORE_EVENT.to_string(),
                request_options: None,
                credential: Some(store.credential.clone()),
                hint_key: store.hint_key.clone(),
            },
        }
    }
}

/// The settled outcome of a mediated event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// Kind of document carried in `data`, such as `VerifiableProfile`.
    #[serde(rename = "dataType")]
    pub data_type: String,
    /// The response document.
    pub data: Value,
}
