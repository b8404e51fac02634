//! Case-insensitive duplicate detection for unique fields.

use std::future::Future;

use crate::errors::{ServiceError, StoreError};

/// Whether `candidate` differs from the persisted value, ignoring case.
/// A missing `current` (create path) always counts as a change.
pub fn differs_ignore_case(candidate: &str, current: Option<&str>) -> bool {
    match current {
        Some(current) => candidate.to_lowercase() != current.to_lowercase(),
        None => true,
    }
}

/// Run `exists` for `candidate` and fail with a conflict when it reports a
/// duplicate.
///
/// Skipped entirely when there is no candidate, or when the candidate equals
/// `current` ignoring case, so re-submitting a field with different casing
/// never collides with the row's own value.
pub async fn ensure_unique<'a, F, Fut>(
    candidate: Option<&'a str>,
    current: Option<&str>,
    exists: F,
    conflict: &str,
) -> Result<(), ServiceError>
where
    F: FnOnce(&'a str) -> Fut,
    Fut: Future<Output = Result<bool, StoreError>>,
{
    let Some(candidate) = candidate else { return Ok(()) };
    if !differs_ignore_case(candidate, current) {
        return Ok(());
    }
    if exists(candidate).await? {
        return Err(ServiceError::Conflict(conflict.to_string()));
    }
    Ok(())
}
