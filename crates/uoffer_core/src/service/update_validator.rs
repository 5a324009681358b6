//! Partial-update emptiness check.
//!
//! Runs before any storage lookup, so a request with no changes fails the
//! same way whether or not its target exists.

use crate::model::analytic::PartialUpdate;
use crate::service::error::{ServiceError, ServiceResult};

/// Rejects updates that carry no supplied fields.
pub fn ensure_has_changes(update: &impl PartialUpdate) -> ServiceResult<()> {
    if update.is_empty() {
        return Err(ServiceError::EmptyUpdate);
    }
    Ok(())
}
