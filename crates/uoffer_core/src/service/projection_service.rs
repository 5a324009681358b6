//! Role-gated read projections.
//!
//! # Responsibility
//! - Merge a post's analytic with its word table, shaped by caller role.
//! - Group posts under their categories for public and admin views.
//!
//! # Invariants
//! - The role is checked before any storage access.
//! - Analytic metrics are identical for every role; only words are shaped.
//! - A category key appears in an aggregate only when the category exists
//!   in the store; posts with stale references are dropped and logged.

use crate::config::WordProjectionPolicy;
use crate::model::analytic::AnalyticWithWords;
use crate::model::post::{PostFilter, PostId, PostSummary};
use crate::model::role::Role;
use crate::model::word::WordBreakdown;
use crate::repo::analytic_repo::AnalyticRepository;
use crate::repo::category_repo::CategoryRepository;
use crate::repo::post_repo::PostRepository;
use crate::service::error::{AnalyticLookup, ServiceError, ServiceResult};
use crate::service::post_resolver::PostResolver;
use log::warn;
use std::collections::{BTreeMap, HashSet};

/// Category title mapped to its posts, oldest first.
pub type CategoryPosts = BTreeMap<String, Vec<PostSummary>>;

/// Projection builder facade.
pub struct ProjectionService<A, P, C>
where
    A: AnalyticRepository,
    P: PostRepository,
    C: CategoryRepository,
{
    analytics: A,
    posts: PostResolver<P>,
    categories: C,
    policy: WordProjectionPolicy,
}

impl<A, P, C> ProjectionService<A, P, C>
where
    A: AnalyticRepository,
    P: PostRepository,
    C: CategoryRepository,
{
    /// Creates the builder with the role redaction policy to apply.
    pub fn new(
        analytics: A,
        posts: PostResolver<P>,
        categories: C,
        policy: WordProjectionPolicy,
    ) -> Self {
        Self {
            analytics,
            posts,
            categories,
            policy,
        }
    }

    /// Returns the analytic of `post_id` with words shaped for `role`.
    pub fn analytic_with_words(
        &self,
        post_id: PostId,
        role: Option<Role>,
    ) -> ServiceResult<AnalyticWithWords> {
        let role = role.ok_or(ServiceError::MissingRole)?;

        let analytic = self
            .analytics
            .get_analytic_by_post(post_id)?
            .ok_or(ServiceError::AnalyticNotFound(AnalyticLookup::Post(post_id)))?;
        let words = self.posts.post_words(post_id)?;

        Ok(AnalyticWithWords {
            analytic,
            words: WordBreakdown::shape(words, self.policy.granularity_for(role)),
        })
    }

    /// Groups public posts by category.
    pub fn categories_with_public_posts(&self) -> ServiceResult<CategoryPosts> {
        self.group_by_category(PostFilter::PublicOnly)
    }

    /// Groups every post by category (administrative view).
    pub fn categories_with_posts(&self) -> ServiceResult<CategoryPosts> {
        self.group_by_category(PostFilter::All)
    }

    fn group_by_category(&self, filter: PostFilter) -> ServiceResult<CategoryPosts> {
        let posts = self.posts.list_posts(filter)?;
        let known = self
            .categories
            .list_categories()?
            .into_iter()
            .map(|category| category.title)
            .collect::<HashSet<_>>();

        let mut grouped = CategoryPosts::new();
        for post in posts {
            if !known.contains(post.category.as_str()) {
                warn!(
                    "event=projection_group module=service status=skipped reason=stale_category post_id={}",
                    post.id
                );
                continue;
            }
            grouped
                .entry(post.category.clone())
                .or_default()
                .push(PostSummary::from(post));
        }

        if grouped.is_empty() {
            return Err(ServiceError::PostNotFound(None));
        }
        Ok(grouped)
    }
}
