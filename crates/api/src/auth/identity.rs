//! Identity resolution at login.

use std::sync::Arc;

use async_trait::async_trait;
use vtrack_db::models::user::User;
use vtrack_db::{Storage, StorageResult};

/// Resolves a login attempt to a known user.
///
/// Handlers depend on this trait only, so a credential-checking provider can
/// replace [`UsernameOnly`] without touching them.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the login is rejected.
    async fn authenticate(&self, username: &str) -> StorageResult<Option<User>>;
}

/// Accepts any existing username. No credential is checked.
pub struct UsernameOnly {
    storage: Arc<dyn Storage>,
}

impl UsernameOnly {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl IdentityProvider for UsernameOnly {
    async fn authenticate(&self, username: &str) -> StorageResult<Option<User>> {
        self.storage.get_user_by_username(username.trim()).await
    }
}
