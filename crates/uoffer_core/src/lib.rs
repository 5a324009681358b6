//! Consistency and aggregation core for uoffer categories, posts and
//! analytics.
//! This crate is the single source of truth for referential integrity,
//! the one-analytic-per-post rule and role-shaped read projections.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, WordProjectionPolicy};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::analytic::{
    Analytic, AnalyticId, AnalyticUpdate, AnalyticWithWords, NewAnalytic, PartialUpdate,
};
pub use model::category::Category;
pub use model::post::{NewPost, Post, PostFilter, PostId, PostSummary};
pub use model::role::Role;
pub use model::word::{derive_word_stats, WordBreakdown, WordGranularity, WordStat};
pub use repo::analytic_repo::{AnalyticRepository, SqliteAnalyticRepository};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::{RepoError, RepoResult};
pub use service::analytic_service::AnalyticService;
pub use service::category_service::{CategoryDeleteMode, CategoryService};
pub use service::error::{AnalyticLookup, ErrorKind, ServiceError, ServiceResult};
pub use service::post_resolver::PostResolver;
pub use service::projection_service::{CategoryPosts, ProjectionService};
pub use service::SqliteServices;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
