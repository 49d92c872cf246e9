//! Engine credentials and the clients built from them
//!
//! [`CredentialResolver`] turns a [`CredentialSet`] into scoped admin/search
//! clients. Components take a `&SearchClients`; the process-wide slot below
//! is only a convenience for hosts that want one shared instance.

mod resolver;

pub use resolver::*;

use crate::config::EngineSettings;
use crate::error::Result;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide clients; replaced wholesale, never mutated in place
static CLIENTS: Lazy<RwLock<Option<Arc<SearchClients>>>> = Lazy::new(|| RwLock::new(None));

/// Resolve clients from settings and install them as the shared instance
pub async fn init(settings: &EngineSettings) -> Result<Arc<SearchClients>> {
    let clients = CredentialResolver::from_settings(settings).resolve().await?;
    Ok(install(clients))
}

/// Replace the shared clients
pub fn install(clients: SearchClients) -> Arc<SearchClients> {
    let clients = Arc::new(clients);
    *CLIENTS.write().unwrap_or_else(PoisonError::into_inner) = Some(clients.clone());
    clients
}

/// The shared clients, if installed
pub fn current() -> Option<Arc<SearchClients>> {
    CLIENTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Drop the shared clients so the next `init` starts from scratch
pub fn reset() {
    *CLIENTS.write().unwrap_or_else(PoisonError::into_inner) = None;
}
