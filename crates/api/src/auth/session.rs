//! Server-side session registry.
//!
//! A session exists from login until logout or expiry. The signed token a
//! client holds is only honoured while its session id is registered here,
//! which is what makes logout effective before the token's own expiry.

use std::collections::HashMap;

use anyhow::{ensure, Context};
use chrono::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;
use vtrack_core::types::{EntityId, Timestamp};

/// Default session lifetime in minutes (12 hours).
const DEFAULT_TTL_MINS: i64 = 720;

/// Session token and cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub secret: String,
    /// Session lifetime in minutes.
    pub ttl_mins: i64,
    /// Mark the session cookie `Secure` (HTTPS only).
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Load session configuration.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `SESSION_SECRET`        | **yes**  | --      |
    /// | `SESSION_TTL_MINS`      | no       | `720`   |
    /// | `SESSION_COOKIE_SECURE` | no       | `false` |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let secret = lookup("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        ensure!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let ttl_mins: i64 = match lookup("SESSION_TTL_MINS") {
            Some(raw) => raw
                .parse()
                .context("SESSION_TTL_MINS must be a valid i64")?,
            None => DEFAULT_TTL_MINS,
        };
        ensure!(ttl_mins > 0, "SESSION_TTL_MINS must be positive");

        let cookie_secure = match lookup("SESSION_COOKIE_SECURE") {
            Some(raw) => crate::config::parse_bool("SESSION_COOKIE_SECURE", &raw)?,
            None => false,
        };

        Ok(Self {
            secret,
            ttl_mins,
            cookie_secure,
        })
    }

    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_mins)
    }
}

/// A registered login session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: EntityId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Session {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// In-memory registry of live sessions, keyed by session id.
///
/// Thread-safe via interior `RwLock`; shared across handlers behind `Arc`.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for `user_id` lasting `ttl`.
    pub async fn create(&self, user_id: EntityId, ttl: Duration) -> Session {
        let now = chrono::Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.id, session.clone());
        session
    }

    /// Look up a live session. Expired sessions are treated as absent.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let now = chrono::Utc::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| !s.is_expired(now))
            .cloned()
    }

    /// Remove a session. Returns `true` if it was registered.
    pub async fn revoke(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Number of registered sessions, including any not yet purged.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
