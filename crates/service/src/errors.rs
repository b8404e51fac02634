use thiserror::Error;

/// Failures reported by an entity store.
///
/// Integrity violations are kept apart from everything else so callers can
/// translate them into domain conflicts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("referential integrity violation: {0}")]
    ForeignKey(String),
    #[error("unique constraint violation: {0}")]
    Unique(String),
    #[error("database error: {0}")]
    Db(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Translate a failed insert/update. A unique index firing means another
    /// writer got there first.
    pub fn on_write(err: StoreError) -> Self {
        match err {
            StoreError::Unique(detail) => Self::Conflict(format!("duplicate value: {detail}")),
            other => Self::Store(other),
        }
    }

    /// Translate a failed delete. Dependent rows block the delete.
    pub fn on_delete(err: StoreError, entity: &str) -> Self {
        match err {
            StoreError::ForeignKey(_) => Self::Conflict(format!("cannot delete {entity}: related records exist")),
            other => Self::Store(other),
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::NotFound(_) => 1002,
            ServiceError::Conflict(_) => 1003,
            ServiceError::Store(_) => 1200,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(err: models::errors::ModelError) -> Self {
        match err {
            models::errors::ModelError::Validation(msg) => Self::Validation(msg),
            models::errors::ModelError::Db(msg) => Self::Store(StoreError::Db(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_fk_violation_becomes_conflict() {
        let err = ServiceError::on_delete(StoreError::ForeignKey("fk_user_city".into()), "city");
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn unrelated_store_errors_pass_through() {
        let err = ServiceError::on_delete(StoreError::Db("connection reset".into()), "city");
        assert!(matches!(err, ServiceError::Store(StoreError::Db(_))));
        let err = ServiceError::on_write(StoreError::Db("timeout".into()));
        assert!(matches!(err, ServiceError::Store(StoreError::Db(_))));
    }

    #[test]
    fn model_validation_maps_to_validation() {
        let err: ServiceError = models::errors::ModelError::Validation("invalid email".into()).into();
        assert_eq!(err.code(), 1001);
    }
}
