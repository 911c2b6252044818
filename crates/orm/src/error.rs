//! Error types for the ORM
//!
//! Base-query failures (`Connection`, `Query`) abort the whole operation.
//! `Relationship` errors are never returned from a fetch: the batch loader
//! records them per parent as a failed relationship status instead.
//! `Validation` only comes out of the insert path, before any SQL runs.

use strata_validation::ValidationErrors;
use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// No usable database session could be obtained
    #[error("Connection error: {0}")]
    Connection(String),

    /// The driver rejected or failed to run a compiled statement
    #[error("Query '{label}' failed: {message}")]
    Query { label: String, message: String },

    /// One or more submitted fields failed validation
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Loading a single relationship failed
    #[error("Relationship '{name}' failed to load: {message}")]
    Relationship { name: String, message: String },

    /// `with` named a relationship the entity does not declare
    #[error("Entity '{entity}' has no relationship named '{name}'")]
    UnknownRelationship { entity: String, name: String },

    /// A row did not have the declared shape or column types
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ModelError {
    /// Driver failure for a labelled operation
    pub fn query(label: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Query {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Failure of one relationship load
    pub fn relationship(name: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Relationship {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns true if no database session could be obtained
    pub fn is_connection(&self) -> bool {
        matches!(self, ModelError::Connection(_))
    }
}

impl From<ValidationErrors> for ModelError {
    fn from(errors: ValidationErrors) -> Self {
        ModelError::Validation(errors)
    }
}

impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => ModelError::Connection(err.to_string()),
            other => ModelError::query("driver", other.to_string()),
        }
    }
}
