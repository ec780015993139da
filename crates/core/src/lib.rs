//! Domain vocabulary for the version tracker.
//!
//! This crate performs no I/O. It holds the enums, identifiers, error type and
//! pure rules (version-set reconciliation, field checks) shared by the storage
//! backends and the HTTP layer.

pub mod activity;
pub mod environment;
pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
pub mod versions;
