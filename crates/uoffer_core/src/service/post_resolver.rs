//! Read-only facade over posts.
//!
//! Consumed by the analytic lifecycle for dependency checks and by the
//! projection builder for category aggregates.

use crate::model::post::{Post, PostFilter, PostId};
use crate::model::word::WordStat;
use crate::repo::post_repo::PostRepository;
use crate::service::error::{ServiceError, ServiceResult};

/// Post reference resolver.
pub struct PostResolver<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostResolver<R> {
    /// Creates resolver from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns whether `post_id` resolves to a stored post.
    pub fn post_exists(&self, post_id: PostId) -> ServiceResult<bool> {
        self.repo.post_exists(post_id).map_err(Into::into)
    }

    /// Loads one post.
    pub fn get_post(&self, post_id: PostId) -> ServiceResult<Post> {
        self.repo
            .get_post(post_id)?
            .ok_or(ServiceError::PostNotFound(Some(post_id)))
    }

    /// Lists posts, oldest first, each carrying its category title.
    pub fn list_posts(&self, filter: PostFilter) -> ServiceResult<Vec<Post>> {
        self.repo.list_posts(filter).map_err(Into::into)
    }

    /// Loads the stored word table of one post.
    pub fn post_words(&self, post_id: PostId) -> ServiceResult<Vec<WordStat>> {
        self.repo.list_post_words(post_id).map_err(Into::into)
    }
}
