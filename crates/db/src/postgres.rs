//! PostgreSQL storage backend.
//!
//! Read-modify-write operations run inside a transaction that first locks
//! the target row with `SELECT ... FOR UPDATE`; concurrent changes to the
//! same service therefore serialize on the row lock.

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection};
use vtrack_core::activity::{self, ActivityAction};
use vtrack_core::environment::Environment;
use vtrack_core::roles::Role;
use vtrack_core::types::{now, EntityId, Timestamp};
use vtrack_core::validation::require_not_blank;

use crate::error::{StorageError, StorageResult};
use crate::models::activity::{Activity, CreateActivity};
use crate::models::request::{CreateRequest, Request, UpdateRequest};
use crate::models::service::{CreateService, Service, UpdateService, VersionChange};
use crate::models::stats::ServiceStats;
use crate::models::user::{CreateUser, User};
use crate::storage::Storage;
use crate::DbPool;

/// Column lists shared across queries to avoid repetition.
const SERVICE_COLUMNS: &str = "id, name, description, icon, icon_color, available_versions, \
                               bau_version, uat_version, prod_version, last_updated";
const ACTIVITY_COLUMNS: &str = "id, action, service_name, environment, from_version, to_version, \
                                details, user_name, \"timestamp\"";
const USER_COLUMNS: &str = "id, username, role";
const REQUEST_COLUMNS: &str = "id, request_name, bau_services, uat_services, bau_delivery_date, \
                               uat_delivery_date, production_date, jira_epic_link, notes, created_at";

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: EntityId,
    action: String,
    service_name: String,
    environment: Option<String>,
    from_version: Option<String>,
    to_version: Option<String>,
    details: Option<String>,
    user_name: String,
    timestamp: Timestamp,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = StorageError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let corrupt = |e: vtrack_core::error::CoreError| {
            StorageError::Backend(format!("activity {}: {e}", row.id))
        };
        let action: ActivityAction = row.action.parse().map_err(corrupt)?;
        let environment = row
            .environment
            .as_deref()
            .map(str::parse::<Environment>)
            .transpose()
            .map_err(corrupt)?;
        Ok(Activity {
            id: row.id,
            action,
            service_name: row.service_name,
            environment,
            from_version: row.from_version,
            to_version: row.to_version,
            details: row.details,
            user: row.user_name,
            timestamp: row.timestamp,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: EntityId,
    username: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StorageError::Backend(format!("user {}: {e}", row.id)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            role,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn a unique violation into `Conflict`, pass everything else through.
fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StorageError::Conflict(message());
        }
    }
    StorageError::Database(err)
}

async fn insert_service(conn: &mut PgConnection, service: &Service) -> StorageResult<()> {
    sqlx::query(
        "INSERT INTO services (id, name, description, icon, icon_color, available_versions,
                               bau_version, uat_version, prod_version, last_updated)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(service.id)
    .bind(&service.name)
    .bind(&service.description)
    .bind(&service.icon)
    .bind(&service.icon_color)
    .bind(&service.available_versions)
    .bind(&service.bau_version)
    .bind(&service.uat_version)
    .bind(&service.prod_version)
    .bind(service.last_updated)
    .execute(conn)
    .await
    .map_err(|e| {
        conflict_on_unique(e, || format!("A service named '{}' already exists", service.name))
    })?;
    Ok(())
}

async fn write_service(conn: &mut PgConnection, service: &Service) -> StorageResult<()> {
    sqlx::query(
        "UPDATE services SET
            name = $2,
            description = $3,
            icon = $4,
            icon_color = $5,
            available_versions = $6,
            bau_version = $7,
            uat_version = $8,
            prod_version = $9,
            last_updated = $10
         WHERE id = $1",
    )
    .bind(service.id)
    .bind(&service.name)
    .bind(&service.description)
    .bind(&service.icon)
    .bind(&service.icon_color)
    .bind(&service.available_versions)
    .bind(&service.bau_version)
    .bind(&service.uat_version)
    .bind(&service.prod_version)
    .bind(service.last_updated)
    .execute(conn)
    .await
    .map_err(|e| {
        conflict_on_unique(e, || format!("A service named '{}' already exists", service.name))
    })?;
    Ok(())
}

async fn insert_activity(
    conn: &mut PgConnection,
    input: CreateActivity,
) -> StorageResult<Activity> {
    let activity = input.into_activity(now())?;
    sqlx::query(
        "INSERT INTO activities (id, action, service_name, environment, from_version,
                                 to_version, details, user_name, \"timestamp\")
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(activity.id)
    .bind(activity.action.as_str())
    .bind(&activity.service_name)
    .bind(activity.environment.map(|e| e.as_str()))
    .bind(&activity.from_version)
    .bind(&activity.to_version)
    .bind(&activity.details)
    .bind(&activity.user)
    .bind(activity.timestamp)
    .execute(conn)
    .await?;
    Ok(activity)
}

async fn lock_service_by_id(
    conn: &mut PgConnection,
    id: EntityId,
) -> StorageResult<Option<Service>> {
    let query = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1 FOR UPDATE");
    Ok(sqlx::query_as::<_, Service>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?)
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// [`Storage`] implementation backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStorage {
    pool: DbPool,
}

impl PgStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: EntityId) -> StorageResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn create_user(&self, input: &CreateUser) -> StorageResult<User> {
        let user = User::from_create(input)?;
        sqlx::query("INSERT INTO users (id, username, role) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.username)
            .bind(user.role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, || format!("Username '{}' is already taken", user.username))
            })?;
        Ok(user)
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username COLLATE \"C\"");
        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn get_all_services(&self) -> StorageResult<Vec<Service>> {
        let query = format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY name COLLATE \"C\"");
        Ok(sqlx::query_as::<_, Service>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_service(&self, id: EntityId) -> StorageResult<Option<Service>> {
        let query = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        Ok(sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_service_by_name(&self, name: &str) -> StorageResult<Option<Service>> {
        let query = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE name = $1");
        Ok(sqlx::query_as::<_, Service>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_service(&self, input: &CreateService) -> StorageResult<Service> {
        let service = Service::from_create(input, now())?;
        let mut conn = self.pool.acquire().await?;
        insert_service(&mut conn, &service).await?;
        Ok(service)
    }

    async fn create_service_with_activity(
        &self,
        input: &CreateService,
        acting_user: &str,
    ) -> StorageResult<Service> {
        let service = Service::from_create(input, now())?;
        let mut tx = self.pool.begin().await?;
        insert_service(&mut tx, &service).await?;
        insert_activity(
            &mut tx,
            CreateActivity::lifecycle(
                ActivityAction::Created,
                &service.name,
                activity::created_details(
                    &service.bau_version,
                    &service.uat_version,
                    &service.prod_version,
                ),
                acting_user,
            ),
        )
        .await?;
        tx.commit().await?;
        Ok(service)
    }

    async fn update_service(
        &self,
        id: EntityId,
        input: &UpdateService,
        acting_user: &str,
    ) -> StorageResult<Service> {
        let mut tx = self.pool.begin().await?;
        let mut service = lock_service_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| StorageError::not_found("Service", id))?;

        let touched = service.apply_update(input, now())?;
        write_service(&mut tx, &service).await?;
        insert_activity(
            &mut tx,
            CreateActivity::lifecycle(
                ActivityAction::Updated,
                &service.name,
                activity::updated_details(&touched),
                acting_user,
            ),
        )
        .await?;
        tx.commit().await?;
        Ok(service)
    }

    async fn delete_service(&self, id: EntityId, acting_user: &str) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        let service = lock_service_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| StorageError::not_found("Service", id))?;

        insert_activity(
            &mut tx,
            CreateActivity::lifecycle(
                ActivityAction::Deleted,
                &service.name,
                activity::deleted_details(&service.name),
                acting_user,
            ),
        )
        .await?;
        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_service_version(&self, change: &VersionChange) -> StorageResult<Service> {
        require_not_blank("version", &change.version)?;

        let mut tx = self.pool.begin().await?;
        let query = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE name = $1 FOR UPDATE");
        let mut service = sqlx::query_as::<_, Service>(&query)
            .bind(&change.service_name)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("Service", &change.service_name))?;

        let old_version = service.change_version(change.environment, &change.version, now());
        write_service(&mut tx, &service).await?;
        insert_activity(
            &mut tx,
            CreateActivity::version_change(
                &service.name,
                change.environment,
                &old_version,
                &change.version,
                &change.user,
            ),
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(
            service = %service.name,
            environment = %change.environment,
            from = %old_version,
            to = %change.version,
            "Version changed (postgres)",
        );
        Ok(service)
    }

    async fn get_all_activities(&self) -> StorageResult<Vec<Activity>> {
        let query = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY \"timestamp\" DESC, seq DESC"
        );
        sqlx::query_as::<_, ActivityRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Activity::try_from)
            .collect()
    }

    async fn create_activity(&self, input: CreateActivity) -> StorageResult<Activity> {
        let mut conn = self.pool.acquire().await?;
        insert_activity(&mut conn, input).await
    }

    async fn get_stats(&self) -> StorageResult<ServiceStats> {
        let services = self.get_all_services().await?;
        Ok(ServiceStats::from_services(&services))
    }

    async fn list_requests(&self) -> StorageResult<Vec<Request>> {
        let query =
            format!("SELECT {REQUEST_COLUMNS} FROM requests ORDER BY created_at DESC, id ASC");
        Ok(sqlx::query_as::<_, Request>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_request(&self, id: &str) -> StorageResult<Option<Request>> {
        let query = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1");
        Ok(sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_request(&self, input: &CreateRequest) -> StorageResult<Request> {
        let request = Request::from_create(input, now())?;
        sqlx::query(
            "INSERT INTO requests (id, request_name, bau_services, uat_services,
                                   bau_delivery_date, uat_delivery_date, production_date,
                                   jira_epic_link, notes, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&request.id)
        .bind(&request.request_name)
        .bind(&request.bau_services)
        .bind(&request.uat_services)
        .bind(request.bau_delivery_date)
        .bind(request.uat_delivery_date)
        .bind(request.production_date)
        .bind(&request.jira_epic_link)
        .bind(&request.notes)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            conflict_on_unique(e, || format!("A request with id '{}' already exists", request.id))
        })?;
        Ok(request)
    }

    async fn update_request(&self, id: &str, input: &UpdateRequest) -> StorageResult<Request> {
        let mut tx = self.pool.begin().await?;
        let query = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1 FOR UPDATE");
        let mut request = sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::not_found("Request", id))?;

        request.apply_update(input)?;
        sqlx::query(
            "UPDATE requests SET
                request_name = $2,
                bau_services = $3,
                uat_services = $4,
                bau_delivery_date = $5,
                uat_delivery_date = $6,
                production_date = $7,
                jira_epic_link = $8,
                notes = $9
             WHERE id = $1",
        )
        .bind(&request.id)
        .bind(&request.request_name)
        .bind(&request.bau_services)
        .bind(&request.uat_services)
        .bind(request.bau_delivery_date)
        .bind(request.uat_delivery_date)
        .bind(request.production_date)
        .bind(&request.jira_epic_link)
        .bind(&request.notes)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(request)
    }

    async fn delete_request(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Request", id));
        }
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
