// src/services/registration.rs
//! Installation and removal of credential handlers.
//!
//! A handler must hold the mediation permission and a registry entry before
//! the host will dispatch events to it. Installation verifies both;
//! uninstallation re-checks the permission and removes the entry.

use log::info;

use crate::errors::{MediationError, Result};
use crate::host::{HandlerRegistration, HandlerRegistry, PermissionManager, PermissionState};

/// Installs a credential handler.
///
/// # Arguments
/// * `registry` - Host registry of handler URLs
/// * `permissions` - Host permission policy
/// * `handler_url` - The handler to install
///
/// # Errors
/// * `MediationError::Validation` for an empty handler URL
/// * `MediationError::Permission` when the host denies the capability
/// * `MediationError::Window` when no registration could be obtained
pub async fn install_handler(
    registry: &dyn HandlerRegistry,
    permissions: &dyn PermissionManager,
    handler_url: &str,
) -> Result<HandlerRegistration> {
    check_handler_url(handler_url)?;
    check_permission(permissions).await?;

    let registration = get_handler_registration(registry, handler_url).await;
    match registration {
        Some(registration) => {
            info!("credential handler installed at {}", registration.url);
            Ok(registration)
        }
        None => Err(MediationError::Window(
            "credential handler not registered".to_string(),
        )),
    }
}

/// Uninstalls a credential handler.
///
/// # Errors
/// * `MediationError::Validation` for an empty handler URL
/// * `MediationError::Permission` when the host denies the capability
pub async fn uninstall_handler(
    registry: &dyn HandlerRegistry,
    permissions: &dyn PermissionManager,
    handler_url: &str,
) -> Result<()> {
    check_handler_url(handler_url)?;
    check_permission(permissions).await?;

    registry.unregister(handler_url).await?;
    info!("credential handler unregistered at {}", handler_url);
    Ok(())
}

/// Looks up (or establishes) the registration for a handler URL.
///
/// Registry failures are absorbed into `None`; callers decide whether a
/// missing registration is fatal.
pub async fn get_handler_registration(
    registry: &dyn HandlerRegistry,
    handler_url: &str,
) -> Option<HandlerRegistration> {
    registry.register(handler_url).await.ok()
}

fn check_handler_url(handler_url: &str) -> Result<()> {
    if handler_url.is_empty() {
        return Err(MediationError::Validation(
            "handler URL must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

async fn check_permission(permissions: &dyn PermissionManager) -> Result<()> {
    match permissions.request_permission().await? {
        PermissionState::Granted => Ok(()),
        PermissionState::Denied => Err(MediationError::Permission(
            "credential hint permission denied".to_string(),
        )),
    }
}
