//! Authentication primitives.
//!
//! - [`identity`] -- Login-time identity resolution behind a trait.
//! - [`session`] -- Server-side session registry and its configuration.
//! - [`token`] -- Signed session tokens.
//! - [`cookie`] -- Session cookie encoding.

pub mod cookie;
pub mod identity;
pub mod session;
pub mod token;
