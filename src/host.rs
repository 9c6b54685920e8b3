// src/host.rs
//! Capability interfaces onto the embedding host.
//!
//! The mediator never references a global environment. Everything it needs
//! from the host arrives through these traits: opening isolated handler
//! windows, connecting an RPC proxy into one, asking for permission, and
//! registering handler URLs. Hosts inject implementations; tests substitute
//! fakes.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::models::event::{HandlerResponse, ProxiedEvent};

/// Opaque reference to a window the host opened.
///
/// The mediator only threads the handle from [`EventSource::open_window`]
/// into [`WindowContext::create_window`]; it never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(String);

impl WindowHandle {
    /// Wraps a host-assigned window token.
    pub fn new(token: impl Into<String>) -> Self {
        WindowHandle(token.into())
    }

    /// The host-assigned token.
    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Host capability for opening isolated handler windows.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Opens a window at `url` and resolves once the host has created it.
    ///
    /// # Errors
    /// Returns `MediationError::Window` if the host refuses or fails to
    /// open the window.
    async fn open_window(&self, url: &str) -> Result<WindowHandle>;
}

/// Per-function options for a callable proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyFunction {
    /// Remote function name.
    pub name: String,
    /// Call timeout. `None` waits indefinitely for the remote handler.
    pub timeout: Option<Duration>,
}

/// Configuration handed to [`ProxyInjector::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Functions the proxy must expose.
    pub functions: Vec<ProxyFunction>,
}

/// A callable proxy into a handler window.
#[async_trait]
pub trait EventProxy: Send + Sync {
    /// Forwards a mediated event to the remote handler and resolves with
    /// its response.
    ///
    /// # Errors
    /// Returns whatever the remote handler rejected with; the caller must
    /// not translate it.
    async fn send(&self, event: ProxiedEvent) -> Result<HandlerResponse>;
}

/// Yields callable proxies once a window context is ready.
pub trait ProxyInjector: Send + Sync {
    /// Returns the named proxy, configured per `config`.
    ///
    /// # Errors
    /// Returns `MediationError::Window` if the window exposes no such
    /// interface.
    fn get(&self, name: &str, config: &ProxyConfig) -> Result<Arc<dyn EventProxy>>;
}

/// The isolated-window RPC transport.
#[async_trait]
pub trait WindowContext: Send + Sync {
    /// Binds an RPC context to an opened window and resolves with its
    /// injector once the window signals readiness.
    ///
    /// Readiness has no inherent bound; the window lifecycle (for example
    /// the user closing it) governs cancellation.
    async fn create_window(&self, url: &str, handle: WindowHandle)
        -> Result<Arc<dyn ProxyInjector>>;
}

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// The host granted the capability.
    Granted,
    /// The host denied the capability.
    Denied,
}

/// Host permission policy.
///
/// Gates profile enumeration and handler installation.
#[async_trait]
pub trait PermissionManager: Send + Sync {
    /// Requests (or re-checks) the mediation permission.
    async fn request_permission(&self) -> Result<PermissionState>;
}

/// A fixed permission decision. Useful for hosts with out-of-band policy
/// and for tests.
pub struct StaticPermissions(pub PermissionState);

#[async_trait]
impl PermissionManager for StaticPermissions {
    async fn request_permission(&self) -> Result<PermissionState> {
        Ok(self.0)
    }
}

/// A credential handler registration held by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRegistration {
    /// The registered handler URL.
    pub url: String,
}

/// Host registry of credential handler URLs.
#[async_trait]
pub trait HandlerRegistry: Send + Sync {
    /// Registers `url` as a credential handler, or returns the existing
    /// registration.
    async fn register(&self, url: &str) -> Result<HandlerRegistration>;

    /// Removes the registration for `url`.
    async fn unregister(&self, url: &str) -> Result<()>;
}
