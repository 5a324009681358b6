//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the category, analytic and
//!   projection use-cases.
//! - Own the closed error taxonomy returned to callers.
//!
//! # Invariants
//! - Services never bypass repository persistence contracts.
//! - The caller role is an explicit argument, never ambient state.

pub mod analytic_service;
pub mod category_service;
pub mod error;
pub mod post_resolver;
pub mod projection_service;
pub mod update_validator;

use crate::config::WordProjectionPolicy;
use crate::repo::analytic_repo::SqliteAnalyticRepository;
use crate::repo::category_repo::SqliteCategoryRepository;
use crate::repo::post_repo::SqlitePostRepository;
use crate::repo::RepoResult;
use analytic_service::AnalyticService;
use category_service::CategoryService;
use post_resolver::PostResolver;
use projection_service::ProjectionService;
use rusqlite::Connection;

/// All core services wired to one SQLite connection.
pub struct SqliteServices<'conn> {
    pub categories: CategoryService<SqliteCategoryRepository<'conn>>,
    pub posts: PostResolver<SqlitePostRepository<'conn>>,
    pub analytics: AnalyticService<SqliteAnalyticRepository<'conn>, SqlitePostRepository<'conn>>,
    pub projections: ProjectionService<
        SqliteAnalyticRepository<'conn>,
        SqlitePostRepository<'conn>,
        SqliteCategoryRepository<'conn>,
    >,
}

impl<'conn> SqliteServices<'conn> {
    /// Builds every service over a migrated connection.
    pub fn try_new(conn: &'conn Connection, policy: WordProjectionPolicy) -> RepoResult<Self> {
        let category_repo = SqliteCategoryRepository::try_new(conn)?;
        let post_repo = SqlitePostRepository::try_new(conn)?;
        let analytic_repo = SqliteAnalyticRepository::try_new(conn)?;

        Ok(Self {
            categories: CategoryService::new(category_repo),
            posts: PostResolver::new(post_repo),
            analytics: AnalyticService::new(analytic_repo, PostResolver::new(post_repo)),
            projections: ProjectionService::new(
                analytic_repo,
                PostResolver::new(post_repo),
                category_repo,
                policy,
            ),
        })
    }
}
