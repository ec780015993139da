use std::sync::Arc;

use vtrack_db::Storage;

use crate::auth::identity::{IdentityProvider, UsernameOnly};
use crate::auth::session::SessionStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The storage backend selected at start-up.
    pub storage: Arc<dyn Storage>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live login sessions.
    pub sessions: Arc<SessionStore>,
    /// Login identity resolution.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// State with an empty session registry and username-only login.
    pub fn new(storage: Arc<dyn Storage>, config: ServerConfig) -> Self {
        Self {
            identity: Arc::new(UsernameOnly::new(Arc::clone(&storage))),
            storage,
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
