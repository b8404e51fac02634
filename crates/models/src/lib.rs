//! SeaORM entities for the courier directory plus the field-format rules
//! shared by every write path.

pub mod errors;
pub mod db;
pub mod department;
pub mod role;
pub mod city;
pub mod user;

use errors::ModelError;

pub const NAME_MAX_LEN: usize = 100;

/// Non-blank text no longer than `max` characters.
pub(crate) fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    if value.chars().count() > max {
        return Err(ModelError::Validation(format!("{field} longer than {max} characters")));
    }
    Ok(())
}
