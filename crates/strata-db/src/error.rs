//! Database-specific error types and conversions.

use strata_core::error::StrataError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for StrataError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StrataError::NotFound { entity, id },
            other => StrataError::Database(other.to_string()),
        }
    }
}
