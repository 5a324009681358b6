//! Category domain model.
//!
//! # Invariants
//! - `title` is the primary key; there is no surrogate id.
//! - Titles are trimmed before comparison and persistence.
//! - Posts reference categories by title; renames cascade to them.

use serde::{Deserialize, Serialize};

/// Category record keyed by its human-readable title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique, non-empty title.
    pub title: String,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// Trims a category title, returning `None` when nothing is left.
pub fn normalize_title(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
