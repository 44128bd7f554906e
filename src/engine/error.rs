use thiserror::Error;

/// Outcome taxonomy for the booking and inventory engine.
///
/// `Validation` is raised before any read or write and never enters a
/// transaction. Everything else is either an explicit pre-check failure
/// (the operation aborts with no writes) or, when detected mid-transaction,
/// causes a full rollback. Nothing is retried by the engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("time conflict with '{label}' (id {id})")]
    Conflict { id: i64, label: String },

    #[error("capacity exceeded, {remaining} remaining")]
    Capacity { remaining: i64 },

    #[error("insufficient ticket inventory, {remaining} remaining")]
    InsufficientInventory { remaining: i64 },

    #[error("student is already registered for this event")]
    DuplicateRegistration,

    #[error("feedback was already submitted for this event")]
    AlreadySubmitted,

    #[error("attendance was not marked for this event")]
    NotEligible,

    #[error("no registration found for this event")]
    NotRegistered,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("integrity violation: {0}")]
    Integrity(#[source] sqlx::Error),

    #[error("database error")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        // Constraint rejections the application did not pre-check surface as
        // integrity violations; the enclosing transaction is rolled back.
        match &err {
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                EngineError::Integrity(err)
            }
            _ => EngineError::Database(err),
        }
    }
}
