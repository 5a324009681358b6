//! Analytic lifecycle use-cases.
//!
//! # Responsibility
//! - Enforce one analytic per post and the post dependency on every write.
//! - Apply partial updates with merge semantics.
//!
//! # Invariants
//! - Validation order on create: duplicate post id, then post existence.
//! - Validation order on update: emptiness, analytic existence, then (only
//!   when `post_id` changes) duplicate post id and post existence.
//! - Service checks fail fast; the storage constraints stay authoritative
//!   and map to the same errors when a concurrent writer wins.
//! - The merge itself happens in the repository under a write lock; the
//!   record read here only drives the pre-checks.

use crate::model::analytic::{Analytic, AnalyticId, AnalyticUpdate, NewAnalytic};
use crate::model::post::PostId;
use crate::repo::analytic_repo::AnalyticRepository;
use crate::repo::post_repo::PostRepository;
use crate::repo::RepoError;
use crate::service::error::{AnalyticLookup, ServiceError, ServiceResult};
use crate::service::post_resolver::PostResolver;
use crate::service::update_validator::ensure_has_changes;
use log::debug;

/// Analytic service facade.
pub struct AnalyticService<A: AnalyticRepository, P: PostRepository> {
    analytics: A,
    posts: PostResolver<P>,
}

impl<A: AnalyticRepository, P: PostRepository> AnalyticService<A, P> {
    /// Creates service from an analytic repository and a post resolver.
    pub fn new(analytics: A, posts: PostResolver<P>) -> Self {
        Self { analytics, posts }
    }

    /// Adds the analytic of one post.
    pub fn add_analytic(&self, analytic: &NewAnalytic) -> ServiceResult<Analytic> {
        self.ensure_post_can_take_analytic(analytic.post_id)?;
        let created = self
            .analytics
            .create_analytic(analytic)
            .map_err(dependency_error)?;
        debug!(
            "event=analytic_add module=service status=ok analytic_id={} post_id={}",
            created.id, created.post_id
        );
        Ok(created)
    }

    /// Applies a partial update to an existing analytic.
    pub fn update_analytic(
        &self,
        id: AnalyticId,
        update: &AnalyticUpdate,
    ) -> ServiceResult<Analytic> {
        ensure_has_changes(update)?;

        let current = self.get_analytic(id)?;
        if let Some(post_id) = update.changed_post_id(&current) {
            self.ensure_post_can_take_analytic(post_id)?;
        }

        let updated = self
            .analytics
            .update_analytic(id, update)
            .map_err(dependency_error)?;
        debug!(
            "event=analytic_update module=service status=ok analytic_id={} post_id={}",
            updated.id, updated.post_id
        );
        Ok(updated)
    }

    /// Deletes one analytic.
    pub fn delete_analytic(&self, id: AnalyticId) -> ServiceResult<()> {
        self.analytics.delete_analytic(id).map_err(Into::into)
    }

    /// Loads one analytic by id.
    pub fn get_analytic(&self, id: AnalyticId) -> ServiceResult<Analytic> {
        self.analytics
            .get_analytic(id)?
            .ok_or(ServiceError::AnalyticNotFound(AnalyticLookup::Id(id)))
    }

    /// Loads the analytic attached to a post.
    pub fn get_analytic_by_post(&self, post_id: PostId) -> ServiceResult<Analytic> {
        self.analytics
            .get_analytic_by_post(post_id)?
            .ok_or(ServiceError::AnalyticNotFound(AnalyticLookup::Post(post_id)))
    }

    fn ensure_post_can_take_analytic(&self, post_id: PostId) -> ServiceResult<()> {
        if self.analytics.get_analytic_by_post(post_id)?.is_some() {
            return Err(ServiceError::PostIdAlreadyExists(post_id));
        }
        if !self.posts.post_exists(post_id)? {
            return Err(ServiceError::AnalyticDependencyNotFound(post_id));
        }
        Ok(())
    }
}

fn dependency_error(err: RepoError) -> ServiceError {
    match err {
        RepoError::PostNotFound(post_id) => ServiceError::AnalyticDependencyNotFound(post_id),
        other => other.into(),
    }
}
