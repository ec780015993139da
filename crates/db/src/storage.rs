//! The storage contract every backend implements.
//!
//! The storage engine is the sole owner of persisted state: every mutation
//! and every invariant on services, activities, users and requests is
//! enforced behind this trait. Read-modify-write operations execute as a
//! critical section per record, so concurrent callers cannot interleave the
//! read of one with the write of another.

use async_trait::async_trait;
use vtrack_core::types::EntityId;

use crate::error::StorageResult;
use crate::models::activity::{Activity, CreateActivity};
use crate::models::request::{CreateRequest, Request, UpdateRequest};
use crate::models::service::{CreateService, Service, UpdateService, VersionChange};
use crate::models::stats::ServiceStats;
use crate::models::user::{CreateUser, User};

#[async_trait]
pub trait Storage: Send + Sync {
    // -- users --------------------------------------------------------------

    async fn get_user(&self, id: EntityId) -> StorageResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, input: &CreateUser) -> StorageResult<User>;

    /// All users ordered by username.
    async fn list_users(&self) -> StorageResult<Vec<User>>;

    // -- services -----------------------------------------------------------

    /// All services ordered by name (byte-wise, case-sensitive).
    async fn get_all_services(&self) -> StorageResult<Vec<Service>>;

    async fn get_service(&self, id: EntityId) -> StorageResult<Option<Service>>;

    async fn get_service_by_name(&self, name: &str) -> StorageResult<Option<Service>>;

    /// Insert a service with defaults applied. Fails with `Validation` on a
    /// blank name and `Conflict` when the name is taken.
    async fn create_service(&self, input: &CreateService) -> StorageResult<Service>;

    /// As [`create_service`](Storage::create_service), then append a
    /// `created` activity in the same critical section.
    async fn create_service_with_activity(
        &self,
        input: &CreateService,
        acting_user: &str,
    ) -> StorageResult<Service>;

    /// Merge supplied fields, restamp, append an `updated` activity.
    async fn update_service(
        &self,
        id: EntityId,
        input: &UpdateService,
        acting_user: &str,
    ) -> StorageResult<Service>;

    /// Append a `deleted` activity carrying the service name, then remove it.
    async fn delete_service(&self, id: EntityId, acting_user: &str) -> StorageResult<()>;

    /// Deploy a version to one environment of the named service, reconcile
    /// its known-version set and append a `version_change` activity.
    async fn update_service_version(&self, change: &VersionChange) -> StorageResult<Service>;

    // -- activities ---------------------------------------------------------

    /// Newest first; equal timestamps order by most recent insertion.
    async fn get_all_activities(&self) -> StorageResult<Vec<Activity>>;

    async fn create_activity(&self, input: CreateActivity) -> StorageResult<Activity>;

    // -- stats --------------------------------------------------------------

    async fn get_stats(&self) -> StorageResult<ServiceStats>;

    // -- requests -----------------------------------------------------------

    /// Newest `created_at` first.
    async fn list_requests(&self) -> StorageResult<Vec<Request>>;

    async fn get_request(&self, id: &str) -> StorageResult<Option<Request>>;

    /// Fails with `Conflict` when the caller-supplied id already exists.
    async fn create_request(&self, input: &CreateRequest) -> StorageResult<Request>;

    async fn update_request(&self, id: &str, input: &UpdateRequest) -> StorageResult<Request>;

    async fn delete_request(&self, id: &str) -> StorageResult<()>;

    // -- infrastructure -----------------------------------------------------

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> StorageResult<()>;

    /// Short backend name for logs (`"memory"`, `"postgres"`).
    fn backend_name(&self) -> &'static str;
}
