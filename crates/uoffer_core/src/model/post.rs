//! Post domain model.
//!
//! Posts are owned by the post-management collaborator. The core only
//! reads them, to validate analytic dependencies and to build category
//! aggregates.

use serde::{Deserialize, Serialize};

/// Stable post identifier assigned by storage.
pub type PostId = i64;

/// Full post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Title of the owning category (non-owning reference).
    pub category: String,
    pub title: String,
    /// Raw body text.
    pub content: String,
    /// Public posts are visible to anonymous readers; others are drafts.
    pub is_public: bool,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// Post shape returned inside category aggregates (body omitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub category: String,
    pub title: String,
    pub is_public: bool,
    pub created_at: i64,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            category: post.category,
            title: post.title,
            is_public: post.is_public,
            created_at: post.created_at,
        }
    }
}

/// Input for creating one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub category: String,
    pub title: String,
    pub content: String,
    pub is_public: bool,
}

impl NewPost {
    /// Builds a post input; `is_public` decides public vs. draft visibility.
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        is_public: bool,
    ) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            content: content.into(),
            is_public,
        }
    }
}

/// Visibility filter for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostFilter {
    /// Every post regardless of visibility.
    #[default]
    All,
    /// Only posts marked public.
    PublicOnly,
}
