//! Analytic repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist per-post analytics in `analytics`.
//! - Map the `UNIQUE(post_id)` and post foreign-key constraints to semantic
//!   errors, so the one-analytic-per-post guarantee holds even when two
//!   writers race past the service-level checks.
//!
//! # Invariants
//! - At most one row per `post_id`.
//! - `post_id` always references an existing post.
//! - Writes run in `BEGIN IMMEDIATE` transactions; a partial update never
//!   overwrites a field it does not carry.

use crate::model::analytic::{Analytic, AnalyticId, AnalyticUpdate, NewAnalytic};
use crate::model::post::PostId;
use crate::repo::{
    constraint_violation, ensure_connection_ready, Constraint, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const ANALYTIC_SELECT_SQL: &str = "SELECT
    id,
    post_id,
    views,
    reactions,
    shares,
    read_seconds,
    created_at,
    updated_at
FROM analytics";

/// Repository interface for analytic operations.
pub trait AnalyticRepository {
    /// Inserts a new analytic and returns the stored record.
    fn create_analytic(&self, analytic: &NewAnalytic) -> RepoResult<Analytic>;
    /// Applies the supplied fields of `update` to an existing analytic.
    ///
    /// Load, merge and write happen under one write lock, so fields absent
    /// from `update` keep whatever value is current at commit time.
    fn update_analytic(&self, id: AnalyticId, update: &AnalyticUpdate) -> RepoResult<Analytic>;
    /// Deletes one analytic by id.
    fn delete_analytic(&self, id: AnalyticId) -> RepoResult<()>;
    /// Loads one analytic by id.
    fn get_analytic(&self, id: AnalyticId) -> RepoResult<Option<Analytic>>;
    /// Loads the analytic attached to a post.
    fn get_analytic_by_post(&self, post_id: PostId) -> RepoResult<Option<Analytic>>;
}

/// SQLite-backed analytic repository.
#[derive(Clone, Copy)]
pub struct SqliteAnalyticRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAnalyticRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["posts", "analytics"])?;
        Ok(Self { conn })
    }
}

impl AnalyticRepository for SqliteAnalyticRepository<'_> {
    fn create_analytic(&self, analytic: &NewAnalytic) -> RepoResult<Analytic> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO analytics (post_id, views, reactions, shares, read_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                analytic.post_id,
                analytic.views,
                analytic.reactions,
                analytic.shares,
                analytic.read_seconds,
            ],
        )
        .map_err(|err| map_post_constraint(err, analytic.post_id))?;

        let id = tx.last_insert_rowid();
        let created = load_analytic(&tx, id)?
            .ok_or_else(|| RepoError::InvalidData(format!("analytic {id} missing after insert")))?;
        tx.commit()?;
        Ok(created)
    }

    fn update_analytic(&self, id: AnalyticId, update: &AnalyticUpdate) -> RepoResult<Analytic> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut analytic = load_analytic(&tx, id)?.ok_or(RepoError::AnalyticNotFound(id))?;
        update.apply_to(&mut analytic);

        tx.execute(
            "UPDATE analytics
             SET
                post_id = ?2,
                views = ?3,
                reactions = ?4,
                shares = ?5,
                read_seconds = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id,
                analytic.post_id,
                analytic.views,
                analytic.reactions,
                analytic.shares,
                analytic.read_seconds,
            ],
        )
        .map_err(|err| map_post_constraint(err, analytic.post_id))?;

        let updated = load_analytic(&tx, id)?.ok_or(RepoError::AnalyticNotFound(id))?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_analytic(&self, id: AnalyticId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM analytics WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::AnalyticNotFound(id));
        }
        Ok(())
    }

    fn get_analytic(&self, id: AnalyticId) -> RepoResult<Option<Analytic>> {
        load_analytic(self.conn, id)
    }

    fn get_analytic_by_post(&self, post_id: PostId) -> RepoResult<Option<Analytic>> {
        let analytic = self
            .conn
            .query_row(
                &format!("{ANALYTIC_SELECT_SQL} WHERE post_id = ?1;"),
                [post_id],
                parse_analytic_row,
            )
            .optional()?;
        Ok(analytic)
    }
}

fn load_analytic(conn: &Connection, id: AnalyticId) -> RepoResult<Option<Analytic>> {
    let analytic = conn
        .query_row(
            &format!("{ANALYTIC_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_analytic_row,
        )
        .optional()?;
    Ok(analytic)
}

fn map_post_constraint(err: rusqlite::Error, post_id: PostId) -> RepoError {
    match constraint_violation(&err) {
        Some(Constraint::Unique) => RepoError::AnalyticPostExists(post_id),
        Some(Constraint::ForeignKey) => RepoError::PostNotFound(post_id),
        None => err.into(),
    }
}

fn parse_analytic_row(row: &Row<'_>) -> rusqlite::Result<Analytic> {
    Ok(Analytic {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        views: row.get("views")?,
        reactions: row.get("reactions")?,
        shares: row.get("shares")?,
        read_seconds: row.get("read_seconds")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
