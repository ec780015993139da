//! Activity (audit log) model and DTO.

use serde::{Deserialize, Serialize};
use vtrack_core::activity::{resolve_actor, ActivityAction};
use vtrack_core::environment::Environment;
use vtrack_core::types::{EntityId, Timestamp};
use vtrack_core::validation::require_not_blank;

use crate::error::{StorageError, StorageResult};

/// An immutable audit-log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: EntityId,
    pub action: ActivityAction,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub user: String,
    pub timestamp: Timestamp,
}

/// DTO for appending an activity. `action` defaults to `version_change`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivity {
    #[serde(default)]
    pub action: ActivityAction,
    pub service_name: String,
    pub environment: Option<Environment>,
    pub from_version: Option<String>,
    pub to_version: Option<String>,
    pub details: Option<String>,
    pub user: Option<String>,
}

impl CreateActivity {
    /// A `version_change` entry.
    pub fn version_change(
        service_name: &str,
        environment: Environment,
        from_version: &str,
        to_version: &str,
        user: &str,
    ) -> Self {
        CreateActivity {
            action: ActivityAction::VersionChange,
            service_name: service_name.to_string(),
            environment: Some(environment),
            from_version: Some(from_version.to_string()),
            to_version: Some(to_version.to_string()),
            details: None,
            user: Some(user.to_string()),
        }
    }

    /// A `created`, `updated` or `deleted` entry.
    pub fn lifecycle(action: ActivityAction, service_name: &str, details: String, user: &str) -> Self {
        CreateActivity {
            action,
            service_name: service_name.to_string(),
            details: Some(details),
            user: Some(user.to_string()),
            ..Default::default()
        }
    }

    /// Stamp an id and timestamp, enforcing the per-action field contract:
    /// environment and versions only on `version_change`, details only on
    /// the other actions.
    pub fn into_activity(self, now: Timestamp) -> StorageResult<Activity> {
        require_not_blank("serviceName", &self.service_name)?;

        let (environment, from_version, to_version, details) = match self.action {
            ActivityAction::VersionChange => {
                let environment = self.environment.ok_or_else(|| {
                    StorageError::Validation("version_change requires an environment".into())
                })?;
                let to_version = self.to_version.ok_or_else(|| {
                    StorageError::Validation("version_change requires toVersion".into())
                })?;
                (
                    Some(environment),
                    Some(self.from_version.unwrap_or_default()),
                    Some(to_version),
                    None,
                )
            }
            _ => (None, None, None, Some(self.details.unwrap_or_default())),
        };

        Ok(Activity {
            id: vtrack_core::types::new_id(),
            action: self.action,
            service_name: self.service_name,
            environment,
            from_version,
            to_version,
            details,
            user: resolve_actor(self.user.as_deref()),
            timestamp: now,
        })
    }
}
