//! Backend-independent storage contract checks.
//!
//! Each function exercises one behaviour against a fresh, empty store and is
//! invoked from both the in-memory and the PostgreSQL test files.

#![allow(dead_code)]

use assert_matches::assert_matches;
use vtrack_core::activity::{ActivityAction, FALLBACK_USER};
use vtrack_core::environment::Environment;
use vtrack_core::roles::Role;
use vtrack_core::types::new_id;
use vtrack_db::models::activity::CreateActivity;
use vtrack_db::models::request::{CreateRequest, UpdateRequest};
use vtrack_db::models::service::{CreateService, Service, UpdateService, VersionChange};
use vtrack_db::models::user::CreateUser;
use vtrack_db::{Storage, StorageError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn new_service(name: &str) -> CreateService {
    CreateService {
        name: name.to_string(),
        description: format!("{name} description"),
        ..Default::default()
    }
}

/// Seed the `auth-service` fixture: BAU 1.2.0, UAT 1.3.0, PROD 1.1.0.
pub async fn seed_auth_service(storage: &dyn Storage) -> Service {
    storage
        .create_service(&CreateService {
            name: "auth-service".into(),
            description: "Authentication & Authorization".into(),
            icon: Some("shield".into()),
            icon_color: Some("blue".into()),
            available_versions: Some(vec!["1.1.0".into(), "1.2.0".into(), "1.3.0".into()]),
            bau_version: Some("1.2.0".into()),
            uat_version: Some("1.3.0".into()),
            prod_version: Some("1.1.0".into()),
        })
        .await
        .expect("seeding auth-service should succeed")
}

pub fn change(service: &str, env: Environment, version: &str, user: &str) -> VersionChange {
    VersionChange {
        service_name: service.to_string(),
        environment: env,
        version: version.to_string(),
        user: user.to_string(),
    }
}

fn sorted(mut versions: Vec<String>) -> Vec<String> {
    versions.sort();
    versions
}

fn new_request(id: &str) -> CreateRequest {
    CreateRequest {
        id: id.to_string(),
        request_name: format!("Rollout {id}"),
        bau_services: Some("auth-service\npayment-service".into()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

pub async fn services_are_listed_by_name(storage: &dyn Storage) {
    for name in ["payment-service", "Zeta", "auth-service"] {
        storage.create_service(&new_service(name)).await.unwrap();
    }
    let names: Vec<String> = storage
        .get_all_services()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Zeta", "auth-service", "payment-service"]);
}

pub async fn create_applies_defaults(storage: &dyn Storage) {
    let svc = storage
        .create_service(&CreateService {
            name: "billing".into(),
            available_versions: Some(vec!["1.0.0".into(), " ".into(), "1.0.0".into()]),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(svc.icon, "cube");
    assert_eq!(svc.icon_color, "blue");
    assert_eq!(svc.available_versions, vec!["1.0.0"]);
    assert_eq!(svc.bau_version, "0.1.0");

    let fetched = storage.get_service(svc.id).await.unwrap().unwrap();
    assert_eq!(fetched, svc);
    let by_name = storage.get_service_by_name("billing").await.unwrap().unwrap();
    assert_eq!(by_name.id, svc.id);
}

pub async fn duplicate_name_is_a_conflict(storage: &dyn Storage) {
    storage.create_service(&new_service("billing")).await.unwrap();
    let result = storage
        .create_service_with_activity(&new_service("billing"), "alice")
        .await;
    assert_matches!(result, Err(StorageError::Conflict(_)));
    assert_eq!(storage.get_all_services().await.unwrap().len(), 1);
    assert!(storage.get_all_activities().await.unwrap().is_empty());
}

pub async fn blank_name_is_rejected(storage: &dyn Storage) {
    let result = storage.create_service(&new_service("  ")).await;
    assert_matches!(result, Err(StorageError::Validation(_)));
    assert!(storage.get_all_services().await.unwrap().is_empty());
}

pub async fn missing_lookups_are_none(storage: &dyn Storage) {
    assert!(storage.get_service(new_id()).await.unwrap().is_none());
    assert!(storage.get_service_by_name("ghost").await.unwrap().is_none());
}

pub async fn create_with_activity_records_created(storage: &dyn Storage) {
    let svc = storage
        .create_service_with_activity(&new_service("billing"), "alice")
        .await
        .unwrap();
    let activities = storage.get_all_activities().await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].action, ActivityAction::Created);
    assert_eq!(activities[0].service_name, svc.name);
    assert_eq!(activities[0].user, "alice");
    assert!(activities[0].details.is_some());
    assert!(activities[0].environment.is_none());
}

pub async fn update_merges_and_logs(storage: &dyn Storage) {
    let svc = seed_auth_service(storage).await;
    let updated = storage
        .update_service(
            svc.id,
            &UpdateService {
                description: Some("Identity".into()),
                bau_version: Some("2.0.0".into()),
                ..Default::default()
            },
            "bob",
        )
        .await
        .unwrap();

    assert_eq!(updated.description, "Identity");
    assert_eq!(updated.name, "auth-service");
    assert_eq!(updated.bau_version, "2.0.0");
    assert!(updated.available_versions.contains(&"2.0.0".to_string()));
    assert!(updated.last_updated >= svc.last_updated);

    let activities = storage.get_all_activities().await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].action, ActivityAction::Updated);
    assert_eq!(activities[0].user, "bob");
    assert_eq!(
        activities[0].details.as_deref(),
        Some("Updated fields: description, bauVersion")
    );
}

pub async fn update_missing_is_not_found(storage: &dyn Storage) {
    let result = storage
        .update_service(new_id(), &UpdateService::default(), "bob")
        .await;
    assert_matches!(result, Err(StorageError::NotFound { .. }));
    assert!(storage.get_all_activities().await.unwrap().is_empty());
}

pub async fn rename_onto_existing_name_is_a_conflict(storage: &dyn Storage) {
    storage.create_service(&new_service("billing")).await.unwrap();
    let other = storage.create_service(&new_service("invoicing")).await.unwrap();
    let result = storage
        .update_service(
            other.id,
            &UpdateService {
                name: Some("billing".into()),
                ..Default::default()
            },
            "bob",
        )
        .await;
    assert_matches!(result, Err(StorageError::Conflict(_)));
    let unchanged = storage.get_service(other.id).await.unwrap().unwrap();
    assert_eq!(unchanged.name, "invoicing");
    assert!(storage.get_all_activities().await.unwrap().is_empty());
}

pub async fn delete_logs_then_removes(storage: &dyn Storage) {
    let svc = seed_auth_service(storage).await;
    storage.delete_service(svc.id, "carol").await.unwrap();

    assert!(storage.get_service(svc.id).await.unwrap().is_none());
    let activities = storage.get_all_activities().await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].action, ActivityAction::Deleted);
    assert_eq!(activities[0].service_name, "auth-service");
    assert_eq!(activities[0].user, "carol");
}

pub async fn delete_missing_appends_nothing(storage: &dyn Storage) {
    let result = storage.delete_service(new_id(), "carol").await;
    assert_matches!(result, Err(StorageError::NotFound { .. }));
    assert!(storage.get_all_activities().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Version changes
// ---------------------------------------------------------------------------

pub async fn promote_to_known_version(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    let svc = storage
        .update_service_version(&change("auth-service", Environment::Prod, "1.3.0", "alice"))
        .await
        .unwrap();

    assert_eq!(svc.prod_version, "1.3.0");
    assert_eq!(sorted(svc.available_versions.clone()), vec!["1.1.0", "1.2.0", "1.3.0"]);

    let activities = storage.get_all_activities().await.unwrap();
    assert_eq!(activities.len(), 1);
    let entry = &activities[0];
    assert_eq!(entry.action, ActivityAction::VersionChange);
    assert_eq!(entry.environment, Some(Environment::Prod));
    assert_eq!(entry.from_version.as_deref(), Some("1.1.0"));
    assert_eq!(entry.to_version.as_deref(), Some("1.3.0"));
    assert_eq!(entry.user, "alice");
    assert!(entry.details.is_none());
}

pub async fn promote_to_unseen_version(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    let svc = storage
        .update_service_version(&change("auth-service", Environment::Prod, "1.4.0", "alice"))
        .await
        .unwrap();

    assert_eq!(
        sorted(svc.available_versions.clone()),
        vec!["1.1.0", "1.2.0", "1.3.0", "1.4.0"]
    );
    let stored = storage.get_service_by_name("auth-service").await.unwrap().unwrap();
    assert_eq!(stored, svc);
}

pub async fn repeated_change_is_state_idempotent(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    let request = change("auth-service", Environment::Uat, "1.5.0", "alice");

    let first = storage.update_service_version(&request).await.unwrap();
    let second = storage.update_service_version(&request).await.unwrap();

    assert_eq!(first.uat_version, second.uat_version);
    assert_eq!(first.available_versions, second.available_versions);
    assert_eq!(storage.get_all_activities().await.unwrap().len(), 2);

    let latest = &storage.get_all_activities().await.unwrap()[0];
    assert_eq!(latest.from_version.as_deref(), Some("1.5.0"));
    assert_eq!(latest.to_version.as_deref(), Some("1.5.0"));
}

pub async fn change_on_missing_service_is_not_found(storage: &dyn Storage) {
    let result = storage
        .update_service_version(&change("ghost", Environment::Bau, "1.0.0", "alice"))
        .await;
    assert_matches!(result, Err(StorageError::NotFound { .. }));
    assert!(storage.get_all_activities().await.unwrap().is_empty());
}

pub async fn blank_version_is_rejected(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    let result = storage
        .update_service_version(&change("auth-service", Environment::Bau, " ", "alice"))
        .await;
    assert_matches!(result, Err(StorageError::Validation(_)));
    assert!(storage.get_all_activities().await.unwrap().is_empty());
}

pub async fn blank_actor_falls_back(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    storage
        .update_service_version(&change("auth-service", Environment::Bau, "1.3.0", ""))
        .await
        .unwrap();
    let activities = storage.get_all_activities().await.unwrap();
    assert_eq!(activities[0].user, FALLBACK_USER);
}

// ---------------------------------------------------------------------------
// Activities & stats
// ---------------------------------------------------------------------------

pub async fn activities_are_newest_first(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    for version in ["1.4.0", "1.5.0", "1.6.0", "1.7.0"] {
        storage
            .update_service_version(&change("auth-service", Environment::Bau, version, "alice"))
            .await
            .unwrap();
    }

    let activities = storage.get_all_activities().await.unwrap();
    assert_eq!(activities.len(), 4);
    assert!(activities
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    // Equal timestamps fall back to insertion order, so the last change leads.
    assert_eq!(activities[0].to_version.as_deref(), Some("1.7.0"));
    assert_eq!(activities[3].to_version.as_deref(), Some("1.4.0"));
}

pub async fn create_activity_applies_defaults(storage: &dyn Storage) {
    let activity = storage
        .create_activity(CreateActivity {
            service_name: "auth-service".into(),
            environment: Some(Environment::Uat),
            from_version: Some("1.0.0".into()),
            to_version: Some("1.1.0".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(activity.action, ActivityAction::VersionChange);
    assert_eq!(activity.user, FALLBACK_USER);
    assert_eq!(storage.get_all_activities().await.unwrap(), vec![activity]);
}

pub async fn stats_on_empty_store_are_zero(storage: &dyn Storage) {
    let stats = storage.get_stats().await.unwrap();
    assert_eq!(stats.total_services, 0);
    assert_eq!(stats.prod_ready_services, 0);
    assert_eq!(stats.uat_services, 0);
    assert_eq!(stats.pending_updates, 0);
}

pub async fn stats_track_current_state(storage: &dyn Storage) {
    seed_auth_service(storage).await;
    storage.create_service(&new_service("billing")).await.unwrap();

    let stats = storage.get_stats().await.unwrap();
    assert_eq!(stats.total_services, storage.get_all_services().await.unwrap().len());
    assert_eq!(stats.total_services, 2);
    assert_eq!(stats.prod_ready_services, 2);
    assert_eq!(stats.uat_services, 1);
    assert_eq!(stats.pending_updates, 1);

    // Align auth-service everywhere; nothing is pending any more.
    for env in [Environment::Bau, Environment::Uat, Environment::Prod] {
        storage
            .update_service_version(&change("auth-service", env, "1.3.0", "alice"))
            .await
            .unwrap();
    }
    let stats = storage.get_stats().await.unwrap();
    assert_eq!(stats.uat_services, 0);
    assert_eq!(stats.pending_updates, 0);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn usernames_are_unique(storage: &dyn Storage) {
    let user = storage
        .create_user(&CreateUser {
            username: "alice".into(),
            role: Role::default(),
        })
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);

    let dup = storage
        .create_user(&CreateUser {
            username: "alice".into(),
            role: Role::Admin,
        })
        .await;
    assert_matches!(dup, Err(StorageError::Conflict(_)));

    assert_eq!(storage.get_user(user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(storage.get_user_by_username("alice").await.unwrap(), Some(user));
    assert!(storage.get_user_by_username("Alice").await.unwrap().is_none());
    assert_eq!(storage.list_users().await.unwrap().len(), 1);
}

pub async fn padded_username_is_stored_trimmed(storage: &dyn Storage) {
    let user = storage
        .create_user(&CreateUser {
            username: "bob ".into(),
            role: Role::User,
        })
        .await
        .unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(storage.get_user_by_username("bob").await.unwrap(), Some(user));

    let dup = storage
        .create_user(&CreateUser {
            username: " bob".into(),
            role: Role::User,
        })
        .await;
    assert_matches!(dup, Err(StorageError::Conflict(_)));
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn padded_request_id_is_rejected(storage: &dyn Storage) {
    let result = storage.create_request(&new_request(" REQ-1")).await;
    assert_matches!(result, Err(StorageError::Validation(_)));
    assert!(storage.list_requests().await.unwrap().is_empty());
}

pub async fn request_lifecycle(storage: &dyn Storage) {
    let created = storage.create_request(&new_request("REQ-1")).await.unwrap();
    assert_eq!(storage.get_request("REQ-1").await.unwrap(), Some(created.clone()));

    let dup = storage.create_request(&new_request("REQ-1")).await;
    assert_matches!(dup, Err(StorageError::Conflict(_)));

    let updated = storage
        .update_request(
            "REQ-1",
            &UpdateRequest {
                notes: Some(Some("ship after freeze".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("ship after freeze"));
    assert_eq!(updated.created_at, created.created_at);

    let invalid = storage
        .update_request(
            "REQ-1",
            &UpdateRequest {
                bau_services: Some(None),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(invalid, Err(StorageError::Validation(_)));

    storage.delete_request("REQ-1").await.unwrap();
    assert!(storage.get_request("REQ-1").await.unwrap().is_none());
    assert_matches!(
        storage.delete_request("REQ-1").await,
        Err(StorageError::NotFound { .. })
    );
    assert_matches!(
        storage.update_request("REQ-1", &UpdateRequest::default()).await,
        Err(StorageError::NotFound { .. })
    );
}

pub async fn requests_are_newest_first(storage: &dyn Storage) {
    storage.create_request(&new_request("REQ-A")).await.unwrap();
    storage.create_request(&new_request("REQ-B")).await.unwrap();
    let listed = storage.list_requests().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].created_at >= listed[1].created_at);
}
