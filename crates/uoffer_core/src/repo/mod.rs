//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define entity-level data access contracts.
//! - Isolate SQL details from service orchestration.
//! - Translate storage constraint violations into semantic errors.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest version.
//! - A UNIQUE/PRIMARY KEY violation is never surfaced as a raw DB error when
//!   it has a domain meaning (duplicate title, duplicate analytic post id).

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::analytic::AnalyticId;
use crate::model::post::PostId;
use rusqlite::{ffi, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod analytic_repo;
pub mod category_repo;
pub mod post_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by category, post and analytic persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error with no domain meaning.
    Db(DbError),
    /// A category with this title already exists.
    CategoryExists(String),
    /// No category with this title.
    CategoryNotFound(String),
    /// The category is still referenced by posts.
    CategoryInUse { title: String, posts: u32 },
    /// No post with this id.
    PostNotFound(PostId),
    /// No analytic with this id.
    AnalyticNotFound(AnalyticId),
    /// An analytic already exists for this post.
    AnalyticPostExists(PostId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CategoryExists(title) => write!(f, "category already exists: {title}"),
            Self::CategoryNotFound(title) => write!(f, "category not found: {title}"),
            Self::CategoryInUse { title, posts } => {
                write!(f, "category `{title}` is referenced by {posts} post(s)")
            }
            Self::PostNotFound(id) => write!(f, "post not found: {id}"),
            Self::AnalyticNotFound(id) => write!(f, "analytic not found: {id}"),
            Self::AnalyticPostExists(post_id) => {
                write!(f, "analytic already exists for post: {post_id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Constraint class of a failed SQLite write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
    Unique,
    ForeignKey,
}

/// Classifies a rusqlite error as a uniqueness or foreign-key violation.
pub(crate) fn constraint_violation(err: &rusqlite::Error) -> Option<Constraint> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    Some(Constraint::Unique)
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Verifies schema version and required tables before a repository is used.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
