//! Start-up data for fresh installs.

use vtrack_core::environment::Environment;
use vtrack_core::roles::Role;

use crate::error::StorageResult;
use crate::models::activity::CreateActivity;
use crate::models::service::CreateService;
use crate::models::user::CreateUser;
use crate::storage::Storage;

/// Username of the bootstrap administrator.
pub const BOOTSTRAP_ADMIN: &str = "admin";

struct SampleService {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    icon_color: &'static str,
    available: &'static [&'static str],
    bau: &'static str,
    uat: &'static str,
    prod: &'static str,
}

const SAMPLE_SERVICES: &[SampleService] = &[
    SampleService {
        name: "auth-service",
        description: "Authentication & Authorization",
        icon: "shield",
        icon_color: "blue",
        available: &["1.1.0", "1.2.0", "1.3.0"],
        bau: "1.2.0",
        uat: "1.3.0",
        prod: "1.1.0",
    },
    SampleService {
        name: "payment-service",
        description: "Payment Processing",
        icon: "credit-card",
        icon_color: "green",
        available: &["2.4.0", "2.5.0", "2.5.1", "2.6.0"],
        bau: "2.5.0",
        uat: "2.5.1",
        prod: "2.4.0",
    },
    SampleService {
        name: "notification-service",
        description: "Email & SMS Notifications",
        icon: "envelope",
        icon_color: "purple",
        available: &["1.8.0", "1.8.1", "1.8.2", "1.9.0"],
        bau: "1.8.2",
        uat: "1.9.0",
        prod: "1.8.1",
    },
    SampleService {
        name: "user-service",
        description: "User Management",
        icon: "users",
        icon_color: "yellow",
        available: &["3.0.5", "3.1.0", "3.1.1", "3.2.0"],
        bau: "3.1.0",
        uat: "3.1.1",
        prod: "3.0.5",
    },
];

/// (service, environment, from, to, user)
const SAMPLE_ACTIVITIES: &[(&str, Environment, &str, &str, &str)] = &[
    ("payment-service", Environment::Uat, "2.4.0", "2.5.1", "Admin"),
    ("auth-service", Environment::Bau, "1.1.0", "1.2.0", "DevOps"),
    ("notification-service", Environment::Prod, "1.8.0", "1.8.1", "QA Team"),
];

/// Create the bootstrap admin account unless a user with that name exists.
///
/// Returns `true` when the account was created.
pub async fn ensure_admin_user(storage: &dyn Storage) -> StorageResult<bool> {
    if storage.get_user_by_username(BOOTSTRAP_ADMIN).await?.is_some() {
        return Ok(false);
    }
    storage
        .create_user(&CreateUser {
            username: BOOTSTRAP_ADMIN.to_string(),
            role: Role::Admin,
        })
        .await?;
    tracing::info!(username = BOOTSTRAP_ADMIN, "Bootstrap admin user created");
    Ok(true)
}

/// Insert the demo services and activities into a store with no services.
///
/// Returns `true` when data was inserted.
pub async fn seed_sample_data(storage: &dyn Storage) -> StorageResult<bool> {
    if !storage.get_all_services().await?.is_empty() {
        return Ok(false);
    }

    for sample in SAMPLE_SERVICES {
        storage
            .create_service(&CreateService {
                name: sample.name.to_string(),
                description: sample.description.to_string(),
                icon: Some(sample.icon.to_string()),
                icon_color: Some(sample.icon_color.to_string()),
                available_versions: Some(sample.available.iter().map(|v| v.to_string()).collect()),
                bau_version: Some(sample.bau.to_string()),
                uat_version: Some(sample.uat.to_string()),
                prod_version: Some(sample.prod.to_string()),
            })
            .await?;
    }

    for (service, env, from, to, user) in SAMPLE_ACTIVITIES {
        storage
            .create_activity(CreateActivity::version_change(service, *env, from, to, user))
            .await?;
    }

    tracing::info!(
        services = SAMPLE_SERVICES.len(),
        activities = SAMPLE_ACTIVITIES.len(),
        "Sample data seeded",
    );
    Ok(true)
}
