//! Entity models and DTOs.
//!
//! Records serialize with camelCase keys, which is the shape the dashboard
//! front end consumes.

pub mod activity;
pub mod request;
pub mod service;
pub mod stats;
pub mod user;

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

/// `validator` rule: the value must contain non-whitespace characters.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`)
/// in partial-update bodies.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
