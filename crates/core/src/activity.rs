//! Activity (audit log) vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::CoreError;

/// Identity recorded when the acting user is blank or anonymous.
pub const FALLBACK_USER: &str = "Admin";

/// Kind of state change an activity describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    #[default]
    VersionChange,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
            ActivityAction::VersionChange => "version_change",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ActivityAction::Created),
            "updated" => Ok(ActivityAction::Updated),
            "deleted" => Ok(ActivityAction::Deleted),
            "version_change" => Ok(ActivityAction::VersionChange),
            other => Err(CoreError::Validation(format!(
                "Unknown activity action '{other}'"
            ))),
        }
    }
}

/// Resolve the identity to record on an activity.
///
/// Blank (or whitespace-only) identities collapse to [`FALLBACK_USER`].
pub fn resolve_actor(user: Option<&str>) -> String {
    match user.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => FALLBACK_USER.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Details text
// ---------------------------------------------------------------------------

/// Details line for a `created` activity.
pub fn created_details(bau: &str, uat: &str, prod: &str) -> String {
    format!(
        "Created service with {} {bau}, {} {uat}, {} {prod}",
        Environment::Bau.label(),
        Environment::Uat.label(),
        Environment::Prod.label(),
    )
}

/// Details line for an `updated` activity listing the supplied fields.
pub fn updated_details(fields: &[&str]) -> String {
    if fields.is_empty() {
        "Updated service (no field changes)".to_string()
    } else {
        format!("Updated fields: {}", fields.join(", "))
    }
}

/// Details line for a `deleted` activity.
pub fn deleted_details(service_name: &str) -> String {
    format!("Deleted service {service_name}")
}
