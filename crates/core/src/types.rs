use chrono::SubsecRound;

/// Generated primary keys (services, activities, users) are UUIDv7.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered entity id.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7()
}

/// Current time truncated to microseconds, the precision PostgreSQL stores.
///
/// Both storage backends stamp records with this so a record returned from a
/// write compares equal to the same record read back later.
pub fn now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(6)
}
