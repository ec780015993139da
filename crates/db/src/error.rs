use vtrack_core::error::CoreError;

/// Failure raised by a [`Storage`](crate::Storage) backend.
///
/// "Not found" and validation failures are ordinary outcomes the caller is
/// expected to translate; `Database` and `Backend` are infrastructure faults.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-sqlx backend failure, e.g. a persisted row that no longer decodes.
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => StorageError::NotFound { entity, key: id },
            CoreError::Validation(msg) => StorageError::Validation(msg),
            CoreError::Conflict(msg) => StorageError::Conflict(msg),
            other => StorageError::Backend(other.to_string()),
        }
    }
}
