pub mod activities;
pub mod auth;
pub mod requests;
pub mod services;
pub mod stats;
pub mod users;

use vtrack_core::types::EntityId;

/// Parse a path id. Anything that is not a well-formed id cannot name an
/// existing record, so callers report it as not found.
pub(crate) fn parse_id(raw: &str) -> Option<EntityId> {
    raw.parse().ok()
}
