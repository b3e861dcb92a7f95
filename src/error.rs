use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure taxonomy for every store operation.
///
/// The stores never swallow or retry a failure; each variant carries enough
/// context (entity name, id, field) for the caller to render a precise
/// message and pick a recovery strategy.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist. Recoverable by the caller.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A required field was missing or malformed on create.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// A name or value fails a declared constraint.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Post-write verification found the stored value does not match what
    /// was requested. Indicates a misbehaving storage backend; surfaced to
    /// the caller rather than retried.
    #[error("post-write verification failed for {entity} {id}: field '{field}' did not persist")]
    Consistency {
        entity: &'static str,
        id: String,
        field: &'static str,
    },

    /// The operation violates a structural rule (non-empty folder delete,
    /// default-folder rename, duplicate version number).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn consistency(entity: &'static str, id: impl ToString, field: &'static str) -> Self {
        Self::Consistency {
            entity,
            id: id.to_string(),
            field,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
