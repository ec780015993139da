//! In-process storage backend.
//!
//! All state sits behind a single async mutex, so every operation (including
//! the multi-step version-change transaction) runs as one critical section.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vtrack_core::activity::{self, ActivityAction};
use vtrack_core::types::{now, EntityId};
use vtrack_core::validation::require_not_blank;

use crate::error::{StorageError, StorageResult};
use crate::models::activity::{Activity, CreateActivity};
use crate::models::request::{CreateRequest, Request, UpdateRequest};
use crate::models::service::{CreateService, Service, UpdateService, VersionChange};
use crate::models::stats::ServiceStats;
use crate::models::user::{CreateUser, User};
use crate::storage::Storage;

#[derive(Default)]
struct State {
    users: HashMap<EntityId, User>,
    services: HashMap<EntityId, Service>,
    /// Insertion order; the index doubles as the ordering tie-breaker.
    activities: Vec<Activity>,
    requests: HashMap<String, Request>,
}

impl State {
    fn service_by_name(&self, name: &str) -> Option<&Service> {
        self.services.values().find(|s| s.name == name)
    }

    fn name_taken(&self, name: &str, except: Option<EntityId>) -> bool {
        self.services
            .values()
            .any(|s| s.name == name && Some(s.id) != except)
    }

    fn insert_service(&mut self, input: &CreateService) -> StorageResult<Service> {
        let service = Service::from_create(input, now())?;
        if self.name_taken(&service.name, None) {
            return Err(StorageError::Conflict(format!(
                "A service named '{}' already exists",
                service.name
            )));
        }
        self.services.insert(service.id, service.clone());
        Ok(service)
    }

    fn append_activity(&mut self, input: CreateActivity) -> StorageResult<Activity> {
        let activity = input.into_activity(now())?;
        self.activities.push(activity.clone());
        Ok(activity)
    }
}

/// [`Storage`] implementation backed by process memory.
#[derive(Default)]
pub struct MemStorage {
    state: Mutex<State>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: EntityId) -> StorageResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, input: &CreateUser) -> StorageResult<User> {
        let mut state = self.state.lock().await;
        let user = User::from_create(input)?;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(StorageError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let mut users: Vec<User> = self.state.lock().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn get_all_services(&self) -> StorageResult<Vec<Service>> {
        let mut services: Vec<Service> =
            self.state.lock().await.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, id: EntityId) -> StorageResult<Option<Service>> {
        Ok(self.state.lock().await.services.get(&id).cloned())
    }

    async fn get_service_by_name(&self, name: &str) -> StorageResult<Option<Service>> {
        Ok(self.state.lock().await.service_by_name(name).cloned())
    }

    async fn create_service(&self, input: &CreateService) -> StorageResult<Service> {
        self.state.lock().await.insert_service(input)
    }

    async fn create_service_with_activity(
        &self,
        input: &CreateService,
        acting_user: &str,
    ) -> StorageResult<Service> {
        let mut state = self.state.lock().await;
        let service = state.insert_service(input)?;
        state.append_activity(CreateActivity::lifecycle(
            ActivityAction::Created,
            &service.name,
            activity::created_details(
                &service.bau_version,
                &service.uat_version,
                &service.prod_version,
            ),
            acting_user,
        ))?;
        Ok(service)
    }

    async fn update_service(
        &self,
        id: EntityId,
        input: &UpdateService,
        acting_user: &str,
    ) -> StorageResult<Service> {
        let mut state = self.state.lock().await;
        let mut service = state
            .services
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Service", id))?;

        let touched = service.apply_update(input, now())?;
        if state.name_taken(&service.name, Some(id)) {
            return Err(StorageError::Conflict(format!(
                "A service named '{}' already exists",
                service.name
            )));
        }

        state.services.insert(id, service.clone());
        state.append_activity(CreateActivity::lifecycle(
            ActivityAction::Updated,
            &service.name,
            activity::updated_details(&touched),
            acting_user,
        ))?;
        Ok(service)
    }

    async fn delete_service(&self, id: EntityId, acting_user: &str) -> StorageResult<()> {
        let mut state = self.state.lock().await;
        let name = state
            .services
            .get(&id)
            .map(|s| s.name.clone())
            .ok_or_else(|| StorageError::not_found("Service", id))?;

        state.append_activity(CreateActivity::lifecycle(
            ActivityAction::Deleted,
            &name,
            activity::deleted_details(&name),
            acting_user,
        ))?;
        state.services.remove(&id);
        Ok(())
    }

    async fn update_service_version(&self, change: &VersionChange) -> StorageResult<Service> {
        require_not_blank("version", &change.version)?;

        let mut state = self.state.lock().await;
        let mut service = state
            .service_by_name(&change.service_name)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Service", &change.service_name))?;

        let old_version = service.change_version(change.environment, &change.version, now());
        state.services.insert(service.id, service.clone());
        state.append_activity(CreateActivity::version_change(
            &service.name,
            change.environment,
            &old_version,
            &change.version,
            &change.user,
        ))?;

        tracing::debug!(
            service = %service.name,
            environment = %change.environment,
            from = %old_version,
            to = %change.version,
            "Version changed (memory)",
        );
        Ok(service)
    }

    async fn get_all_activities(&self) -> StorageResult<Vec<Activity>> {
        let state = self.state.lock().await;
        // Reverse insertion order first so the stable sort keeps the most
        // recently inserted entry ahead on equal timestamps.
        let mut activities: Vec<Activity> = state.activities.iter().rev().cloned().collect();
        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(activities)
    }

    async fn create_activity(&self, input: CreateActivity) -> StorageResult<Activity> {
        self.state.lock().await.append_activity(input)
    }

    async fn get_stats(&self) -> StorageResult<ServiceStats> {
        let state = self.state.lock().await;
        let services: Vec<Service> = state.services.values().cloned().collect();
        Ok(ServiceStats::from_services(&services))
    }

    async fn list_requests(&self) -> StorageResult<Vec<Request>> {
        let mut requests: Vec<Request> =
            self.state.lock().await.requests.values().cloned().collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn get_request(&self, id: &str) -> StorageResult<Option<Request>> {
        Ok(self.state.lock().await.requests.get(id).cloned())
    }

    async fn create_request(&self, input: &CreateRequest) -> StorageResult<Request> {
        let mut state = self.state.lock().await;
        let request = Request::from_create(input, now())?;
        if state.requests.contains_key(&request.id) {
            return Err(StorageError::Conflict(format!(
                "A request with id '{}' already exists",
                request.id
            )));
        }
        state.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn update_request(&self, id: &str, input: &UpdateRequest) -> StorageResult<Request> {
        let mut state = self.state.lock().await;
        let mut request = state
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("Request", id))?;
        request.apply_update(input)?;
        state.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn delete_request(&self, id: &str) -> StorageResult<()> {
        self.state
            .lock()
            .await
            .requests
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("Request", id))
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
