pub mod repository;
pub mod seed;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Schema initialization failed: {0}")]
    SchemaFailed(String),

    #[error("Invalid seed data in {path}: {reason}")]
    InvalidSeed { path: String, reason: String },
}

impl DatabaseError {
    /// Map a uniqueness/primary-key violation to `Conflict`, leaving other
    /// SQLite failures untouched.
    pub(crate) fn from_insert(err: rusqlite::Error, what: impl FnOnce() -> String) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::Conflict(what())
            }
            _ => DatabaseError::Sqlite(err),
        }
    }
}
