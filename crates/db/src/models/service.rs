//! Service entity model, DTOs and the mutations both backends share.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use vtrack_core::environment::Environment;
use vtrack_core::types::{EntityId, Timestamp};
use vtrack_core::validation::require_not_blank;
use vtrack_core::versions::{self, DEFAULT_VERSION};

use super::not_blank;
use crate::error::StorageResult;

pub const DEFAULT_ICON: &str = "cube";
pub const DEFAULT_ICON_COLOR: &str = "blue";

/// A row from the `services` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub icon_color: String,
    pub available_versions: Vec<String>,
    pub bau_version: String,
    pub uat_version: String,
    pub prod_version: String,
    pub last_updated: Timestamp,
}

/// DTO for creating a service. Omitted fields take their defaults.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub icon: Option<String>,
    pub icon_color: Option<String>,
    pub available_versions: Option<Vec<String>>,
    pub bau_version: Option<String>,
    pub uat_version: Option<String>,
    pub prod_version: Option<String>,
}

/// DTO for a partial update. Only supplied fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub icon_color: Option<String>,
    pub available_versions: Option<Vec<String>>,
    pub bau_version: Option<String>,
    pub uat_version: Option<String>,
    pub prod_version: Option<String>,
}

/// Body of `PATCH /services/version`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceVersion {
    #[validate(custom(function = "not_blank"))]
    pub service_name: String,
    pub environment: Environment,
    #[validate(custom(function = "not_blank"))]
    pub version: String,
}

/// A version change together with the identity performing it.
#[derive(Debug, Clone)]
pub struct VersionChange {
    pub service_name: String,
    pub environment: Environment,
    pub version: String,
    pub user: String,
}

impl UpdateServiceVersion {
    pub fn by(self, user: impl Into<String>) -> VersionChange {
        VersionChange {
            service_name: self.service_name,
            environment: self.environment,
            version: self.version,
            user: user.into(),
        }
    }
}

fn or_default(value: Option<&String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

impl Service {
    /// Build a new record from a create DTO, applying defaults.
    pub fn from_create(input: &CreateService, now: Timestamp) -> StorageResult<Service> {
        require_not_blank("name", &input.name)?;

        let available_versions = match &input.available_versions {
            Some(list) => versions::normalize(list),
            None => vec![DEFAULT_VERSION.to_string()],
        };

        Ok(Service {
            id: vtrack_core::types::new_id(),
            name: input.name.clone(),
            description: input.description.clone(),
            icon: or_default(input.icon.as_ref(), DEFAULT_ICON),
            icon_color: or_default(input.icon_color.as_ref(), DEFAULT_ICON_COLOR),
            available_versions,
            bau_version: or_default(input.bau_version.as_ref(), DEFAULT_VERSION),
            uat_version: or_default(input.uat_version.as_ref(), DEFAULT_VERSION),
            prod_version: or_default(input.prod_version.as_ref(), DEFAULT_VERSION),
            last_updated: now,
        })
    }

    /// The version currently deployed to `env`.
    pub fn version(&self, env: Environment) -> &str {
        match env {
            Environment::Bau => &self.bau_version,
            Environment::Uat => &self.uat_version,
            Environment::Prod => &self.prod_version,
        }
    }

    fn version_mut(&mut self, env: Environment) -> &mut String {
        match env {
            Environment::Bau => &mut self.bau_version,
            Environment::Uat => &mut self.uat_version,
            Environment::Prod => &mut self.prod_version,
        }
    }

    fn reconcile_versions(&mut self) {
        self.available_versions = versions::reconcile(
            &self.available_versions,
            [&self.bau_version, &self.uat_version, &self.prod_version],
        );
    }

    /// Deploy `version` to `env`, returning the version it replaced.
    ///
    /// The known-version set is reconciled afterwards, so `version` is always
    /// a member of it on return.
    pub fn change_version(&mut self, env: Environment, version: &str, now: Timestamp) -> String {
        let old = std::mem::replace(self.version_mut(env), version.to_string());
        self.reconcile_versions();
        self.last_updated = now;
        old
    }

    /// Merge a partial update, returning the names of the supplied fields.
    pub fn apply_update(
        &mut self,
        input: &UpdateService,
        now: Timestamp,
    ) -> StorageResult<Vec<&'static str>> {
        let mut touched = Vec::new();

        if let Some(name) = &input.name {
            require_not_blank("name", name)?;
            self.name = name.clone();
            touched.push("name");
        }
        if let Some(description) = &input.description {
            self.description = description.clone();
            touched.push("description");
        }
        if let Some(icon) = &input.icon {
            self.icon = or_default(Some(icon), DEFAULT_ICON);
            touched.push("icon");
        }
        if let Some(color) = &input.icon_color {
            self.icon_color = or_default(Some(color), DEFAULT_ICON_COLOR);
            touched.push("iconColor");
        }

        let mut versions_touched = false;
        if let Some(list) = &input.available_versions {
            self.available_versions = versions::normalize(list);
            touched.push("availableVersions");
            versions_touched = true;
        }
        for (env, value, field) in [
            (Environment::Bau, &input.bau_version, "bauVersion"),
            (Environment::Uat, &input.uat_version, "uatVersion"),
            (Environment::Prod, &input.prod_version, "prodVersion"),
        ] {
            if let Some(v) = value {
                require_not_blank(field, v)?;
                *self.version_mut(env) = v.clone();
                touched.push(field);
                versions_touched = true;
            }
        }
        if versions_touched {
            self.reconcile_versions();
        }

        self.last_updated = now;
        Ok(touched)
    }

    /// The prod version is one the service is known to ship.
    pub fn is_prod_ready(&self) -> bool {
        self.available_versions.iter().any(|v| *v == self.prod_version)
    }

    /// UAT runs something other than prod.
    pub fn has_uat_candidate(&self) -> bool {
        self.uat_version != self.prod_version
    }

    /// BAU or UAT is ahead of (or different from) prod.
    pub fn has_pending_update(&self) -> bool {
        self.bau_version != self.prod_version || self.uat_version != self.prod_version
    }
}
