//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the session user; 401 without one.
//! - [`rbac::RequireAdmin`] -- Additionally requires the `admin` role; 403 otherwise.

pub mod auth;
pub mod rbac;
