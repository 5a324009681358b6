//! Category repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `categories` keyed by title.
//! - Keep rename and delete atomic with respect to referencing posts.
//!
//! # Invariants
//! - Inserts never overwrite an existing title.
//! - Renames cascade to `posts.category` inside the same statement.
//! - Restrict-mode deletes leave storage untouched while posts reference
//!   the title.

use crate::model::category::Category;
use crate::repo::{
    constraint_violation, ensure_connection_ready, Constraint, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for category operations.
pub trait CategoryRepository {
    /// Inserts a new category; fails when the title is taken.
    fn create_category(&self, title: &str) -> RepoResult<Category>;
    /// Renames a category and every post reference to it.
    fn rename_category(&self, old_title: &str, new_title: &str) -> RepoResult<Category>;
    /// Deletes a category only when no post references it.
    fn delete_category_restrict(&self, title: &str) -> RepoResult<()>;
    /// Deletes a category together with its posts.
    fn delete_category_cascade(&self, title: &str) -> RepoResult<()>;
    /// Loads one category by title.
    fn get_category(&self, title: &str) -> RepoResult<Option<Category>>;
    /// Lists all categories ordered by title.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
}

/// SQLite-backed category repository.
#[derive(Clone, Copy)]
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["categories", "posts"])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, title: &str) -> RepoResult<Category> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_category(&tx, title)?.is_some() {
            return Err(RepoError::CategoryExists(title.to_string()));
        }

        tx.execute("INSERT INTO categories (title) VALUES (?1);", [title])
            .map_err(|err| match constraint_violation(&err) {
                Some(Constraint::Unique) => RepoError::CategoryExists(title.to_string()),
                _ => err.into(),
            })?;

        let category = load_category(&tx, title)?.ok_or_else(|| {
            RepoError::InvalidData(format!("category `{title}` missing after insert"))
        })?;
        tx.commit()?;
        Ok(category)
    }

    fn rename_category(&self, old_title: &str, new_title: &str) -> RepoResult<Category> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = load_category(&tx, old_title)?
            .ok_or_else(|| RepoError::CategoryNotFound(old_title.to_string()))?;
        if old_title == new_title {
            return Ok(existing);
        }
        if load_category(&tx, new_title)?.is_some() {
            return Err(RepoError::CategoryExists(new_title.to_string()));
        }

        tx.execute(
            "UPDATE categories SET title = ?2 WHERE title = ?1;",
            params![old_title, new_title],
        )
        .map_err(|err| match constraint_violation(&err) {
            Some(Constraint::Unique) => RepoError::CategoryExists(new_title.to_string()),
            _ => err.into(),
        })?;

        let renamed = load_category(&tx, new_title)?.ok_or_else(|| {
            RepoError::InvalidData(format!("category `{new_title}` missing after rename"))
        })?;
        tx.commit()?;
        Ok(renamed)
    }

    fn delete_category_restrict(&self, title: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_category(&tx, title)?.is_none() {
            return Err(RepoError::CategoryNotFound(title.to_string()));
        }

        let posts = count_posts_in_category(&tx, title)?;
        if posts > 0 {
            return Err(RepoError::CategoryInUse {
                title: title.to_string(),
                posts,
            });
        }

        tx.execute("DELETE FROM categories WHERE title = ?1;", [title])
            .map_err(|err| match constraint_violation(&err) {
                Some(Constraint::ForeignKey) => RepoError::CategoryInUse {
                    title: title.to_string(),
                    posts: 0,
                },
                _ => err.into(),
            })?;
        tx.commit()?;
        Ok(())
    }

    fn delete_category_cascade(&self, title: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_category(&tx, title)?.is_none() {
            return Err(RepoError::CategoryNotFound(title.to_string()));
        }

        // analytics and post_words rows follow their posts via ON DELETE CASCADE
        tx.execute("DELETE FROM posts WHERE category = ?1;", [title])?;
        tx.execute("DELETE FROM categories WHERE title = ?1;", [title])?;
        tx.commit()?;
        Ok(())
    }

    fn get_category(&self, title: &str) -> RepoResult<Option<Category>> {
        load_category(self.conn, title)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, created_at
             FROM categories
             ORDER BY title ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }
}

fn load_category(conn: &Connection, title: &str) -> RepoResult<Option<Category>> {
    let category = conn
        .query_row(
            "SELECT title, created_at
             FROM categories
             WHERE title = ?1;",
            [title],
            parse_category_row,
        )
        .optional()?;
    Ok(category)
}

fn count_posts_in_category(conn: &Connection, title: &str) -> RepoResult<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE category = ?1;",
        [title],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_category_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        title: row.get("title")?,
        created_at: row.get("created_at")?,
    })
}
