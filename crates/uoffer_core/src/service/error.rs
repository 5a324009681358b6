//! Closed error taxonomy returned by every core use-case.
//!
//! # Invariants
//! - Every failing path returns exactly one variant.
//! - Repository failures without a domain meaning collapse into
//!   `Unexpected`; the original error stays reachable through `source()`.
//! - No transport status codes live here; callers map `ErrorKind`.

use crate::model::analytic::AnalyticId;
use crate::model::post::PostId;
use crate::repo::RepoError;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fieldless discriminant of `ServiceError`, used for boundary mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CategoryAlreadyExists,
    CategoryNotFound,
    CategoryInUse,
    InvalidTitle,
    PostNotFound,
    PostIdAlreadyExists,
    AnalyticNotFound,
    AnalyticDependencyNotFound,
    EmptyUpdate,
    MissingRole,
    Unexpected,
}

/// Error returned by core services.
#[derive(Debug)]
pub enum ServiceError {
    /// Category title already present.
    CategoryAlreadyExists(String),
    /// Category title absent, or no categories at all when `None`.
    CategoryNotFound(Option<String>),
    /// Restrict-mode delete refused while posts reference the category.
    CategoryInUse { title: String, posts: u32 },
    /// Category title is blank after trimming.
    InvalidTitle,
    /// Referenced post absent, or no post matched a listing when `None`.
    PostNotFound(Option<PostId>),
    /// An analytic already exists for this post.
    PostIdAlreadyExists(PostId),
    /// No analytic with this id, or none attached to this post.
    AnalyticNotFound(AnalyticLookup),
    /// The analytic's post does not exist.
    AnalyticDependencyNotFound(PostId),
    /// Partial update carries no fields.
    EmptyUpdate,
    /// No caller role where one is required.
    MissingRole,
    /// Any other persistence/internal failure.
    Unexpected(RepoError),
}

/// How a missing analytic was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticLookup {
    Id(AnalyticId),
    Post(PostId),
}

impl ServiceError {
    /// Returns the fieldless kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CategoryAlreadyExists(_) => ErrorKind::CategoryAlreadyExists,
            Self::CategoryNotFound(_) => ErrorKind::CategoryNotFound,
            Self::CategoryInUse { .. } => ErrorKind::CategoryInUse,
            Self::InvalidTitle => ErrorKind::InvalidTitle,
            Self::PostNotFound(_) => ErrorKind::PostNotFound,
            Self::PostIdAlreadyExists(_) => ErrorKind::PostIdAlreadyExists,
            Self::AnalyticNotFound(_) => ErrorKind::AnalyticNotFound,
            Self::AnalyticDependencyNotFound(_) => ErrorKind::AnalyticDependencyNotFound,
            Self::EmptyUpdate => ErrorKind::EmptyUpdate,
            Self::MissingRole => ErrorKind::MissingRole,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CategoryAlreadyExists(title) => write!(f, "category already exists: {title}"),
            Self::CategoryNotFound(Some(title)) => write!(f, "category not found: {title}"),
            Self::CategoryNotFound(None) => write!(f, "no categories found"),
            Self::CategoryInUse { title, posts } => write!(
                f,
                "category `{title}` still has {posts} post(s); delete them first or use cascade"
            ),
            Self::InvalidTitle => write!(f, "category title must not be blank"),
            Self::PostNotFound(Some(id)) => write!(f, "post not found: {id}"),
            Self::PostNotFound(None) => write!(f, "no posts found"),
            Self::PostIdAlreadyExists(post_id) => {
                write!(f, "analytic for post {post_id} already exists")
            }
            Self::AnalyticNotFound(AnalyticLookup::Id(id)) => {
                write!(f, "analytic not found: {id}")
            }
            Self::AnalyticNotFound(AnalyticLookup::Post(post_id)) => {
                write!(f, "analytic not found for post: {post_id}")
            }
            Self::AnalyticDependencyNotFound(post_id) => {
                write!(f, "analytic references missing post: {post_id}")
            }
            Self::EmptyUpdate => write!(f, "analytic has no changes"),
            Self::MissingRole => write!(f, "caller role not found"),
            Self::Unexpected(err) => write!(f, "unexpected storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unexpected(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CategoryExists(title) => Self::CategoryAlreadyExists(title),
            RepoError::CategoryNotFound(title) => Self::CategoryNotFound(Some(title)),
            RepoError::CategoryInUse { title, posts } => Self::CategoryInUse { title, posts },
            RepoError::PostNotFound(id) => Self::PostNotFound(Some(id)),
            RepoError::AnalyticNotFound(id) => Self::AnalyticNotFound(AnalyticLookup::Id(id)),
            RepoError::AnalyticPostExists(post_id) => Self::PostIdAlreadyExists(post_id),
            other => Self::Unexpected(other),
        }
    }
}

/// Result type used by core services.
pub type ServiceResult<T> = Result<T, ServiceError>;
