use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::debug;

use crate::validation::ValidationErrors;

/// Failure kinds that cross the service boundary.
///
/// `NotFound`, `IntegrityConflict` and `Validation` are domain outcomes the caller is expected
/// to report; `Db` and `Hash` are defects of the environment and fail the request outright.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    IntegrityConflict(String),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("database error: {0}")]
    Db(String),
    #[error("hashing error: {0}")]
    Hash(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i64) -> Self { Self::NotFound(format!("{} {} not found", entity, id)) }

    pub fn integrity_violation() -> Self { Self::IntegrityConflict("Integrity violation".into()) }

    /// True for the kinds that are not domain outcomes.
    pub fn is_fatal(&self) -> bool { matches!(self, Self::Db(_) | Self::Hash(_)) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                debug!(%detail, "unique constraint violated");
                Self::integrity_violation()
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                debug!(%detail, "foreign key constraint violated");
                Self::integrity_violation()
            }
            _ => Self::Db(e.to_string()),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(e: ValidationErrors) -> Self { Self::Validation(e) }
}
