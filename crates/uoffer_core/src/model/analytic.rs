//! Analytic domain model and partial-update representation.
//!
//! # Responsibility
//! - Define the per-post metrics record (1:1 with `Post`).
//! - Define `AnalyticUpdate`, where every field is optional so "not
//!   supplied" and "set to zero" stay distinguishable.
//!
//! # Invariants
//! - `post_id` is unique across all analytics.
//! - Applying an update only touches fields that are `Some`.

use crate::model::post::PostId;
use crate::model::word::WordBreakdown;
use serde::{Deserialize, Serialize};

/// Stable analytic identifier assigned by storage.
pub type AnalyticId = i64;

/// Persisted per-post metrics record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytic {
    pub id: AnalyticId,
    /// Owning post; also the uniqueness key.
    pub post_id: PostId,
    pub views: u32,
    pub reactions: u32,
    pub shares: u32,
    /// Accumulated reading time in seconds.
    pub read_seconds: u32,
    /// Epoch ms, server-assigned.
    pub created_at: i64,
    /// Epoch ms, server-assigned.
    pub updated_at: i64,
}

/// Input for creating one analytic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnalytic {
    pub post_id: PostId,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub reactions: u32,
    #[serde(default)]
    pub shares: u32,
    #[serde(default)]
    pub read_seconds: u32,
}

impl NewAnalytic {
    /// Creates an input with zeroed counters for `post_id`.
    pub fn for_post(post_id: PostId) -> Self {
        Self {
            post_id,
            ..Self::default()
        }
    }
}

/// Update objects that can be checked for emptiness before persistence.
pub trait PartialUpdate {
    /// Returns `true` when no field is supplied.
    fn is_empty(&self) -> bool;
}

/// Partial analytic update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<PostId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_seconds: Option<u32>,
}

impl AnalyticUpdate {
    /// Returns the new post id when the update moves the analytic to
    /// another post.
    pub fn changed_post_id(&self, current: &Analytic) -> Option<PostId> {
        self.post_id.filter(|post_id| *post_id != current.post_id)
    }

    /// Merges supplied fields into `target`, leaving the rest untouched.
    pub fn apply_to(&self, target: &mut Analytic) {
        if let Some(post_id) = self.post_id {
            target.post_id = post_id;
        }
        if let Some(views) = self.views {
            target.views = views;
        }
        if let Some(reactions) = self.reactions {
            target.reactions = reactions;
        }
        if let Some(shares) = self.shares {
            target.shares = shares;
        }
        if let Some(read_seconds) = self.read_seconds {
            target.read_seconds = read_seconds;
        }
    }
}

impl PartialUpdate for AnalyticUpdate {
    fn is_empty(&self) -> bool {
        self.post_id.is_none()
            && self.views.is_none()
            && self.reactions.is_none()
            && self.shares.is_none()
            && self.read_seconds.is_none()
    }
}

/// Read-only composite of an analytic and its post's word statistics.
///
/// Assembled on read and never persisted. The shape of `words` depends on
/// the caller role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticWithWords {
    #[serde(flatten)]
    pub analytic: Analytic,
    pub words: WordBreakdown,
}

#[cfg(test)]
mod tests {
    use super::{Analytic, AnalyticUpdate, PartialUpdate};

    fn sample() -> Analytic {
        Analytic {
            id: 1,
            post_id: 10,
            views: 1,
            reactions: 2,
            shares: 3,
            read_seconds: 4,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn default_update_is_empty() {
        assert!(AnalyticUpdate::default().is_empty());
    }

    #[test]
    fn zero_valued_field_is_not_empty() {
        let update = AnalyticUpdate {
            views: Some(0),
            ..AnalyticUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn apply_to_keeps_unset_fields() {
        let mut analytic = sample();
        let update = AnalyticUpdate {
            views: Some(9),
            ..AnalyticUpdate::default()
        };
        update.apply_to(&mut analytic);

        assert_eq!(analytic.views, 9);
        assert_eq!(analytic.reactions, 2);
        assert_eq!(analytic.shares, 3);
        assert_eq!(analytic.read_seconds, 4);
        assert_eq!(analytic.post_id, 10);
    }

    #[test]
    fn changed_post_id_ignores_same_value() {
        let analytic = sample();
        let same = AnalyticUpdate {
            post_id: Some(10),
            ..AnalyticUpdate::default()
        };
        let moved = AnalyticUpdate {
            post_id: Some(11),
            ..AnalyticUpdate::default()
        };
        assert_eq!(same.changed_post_id(&analytic), None);
        assert_eq!(moved.changed_post_id(&analytic), Some(11));
    }

    #[test]
    fn json_null_and_missing_fields_are_unset() {
        let update: AnalyticUpdate =
            serde_json::from_str(r#"{"views": null, "shares": 0}"#).unwrap();
        assert_eq!(update.views, None);
        assert_eq!(update.shares, Some(0));
        assert!(!update.is_empty());
    }
}
