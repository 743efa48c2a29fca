//! Database-specific error types and conversions.

use custos_core::error::CustosError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    /// A statement was rejected after submission, e.g. a unique-index
    /// or ASSERT constraint violation surfaced by `.check()`.
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped back into a domain type.
    #[error("Row conversion failed: {0}")]
    Conversion(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for CustosError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CustosError::NotFound { entity, id },
            other => CustosError::StoreUnavailable(other.to_string()),
        }
    }
}
