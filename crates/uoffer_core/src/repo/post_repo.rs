//! Post repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Expose post reads used for dependency checks and aggregates.
//! - Provide the write interface used by the post-management collaborator
//!   (create, visibility changes, word table replacement).
//!
//! # Invariants
//! - Listings are deterministic: `created_at ASC, id ASC`.
//! - A post's word table is replaced as a whole, in one transaction.

use crate::model::post::{NewPost, Post, PostFilter, PostId};
use crate::model::word::{sort_word_stats, WordStat};
use crate::repo::{
    bool_to_int, constraint_violation, ensure_connection_ready, int_to_bool, Constraint,
    RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const POST_SELECT_SQL: &str = "SELECT
    id,
    category,
    title,
    content,
    is_public,
    created_at
FROM posts";

/// Repository interface for post operations.
pub trait PostRepository {
    /// Inserts one post; the category must exist.
    fn create_post(&self, post: &NewPost) -> RepoResult<Post>;
    /// Loads one post by id.
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    /// Returns whether a post with `id` exists.
    fn post_exists(&self, id: PostId) -> RepoResult<bool>;
    /// Lists posts matching the visibility filter.
    fn list_posts(&self, filter: PostFilter) -> RepoResult<Vec<Post>>;
    /// Publishes or unpublishes one post.
    fn set_post_visibility(&self, id: PostId, is_public: bool) -> RepoResult<()>;
    /// Replaces the full word table of one post.
    fn replace_post_words(&self, id: PostId, words: &[WordStat]) -> RepoResult<()>;
    /// Loads the word table of one post in canonical order.
    fn list_post_words(&self, id: PostId) -> RepoResult<Vec<WordStat>>;
}

/// SQLite-backed post repository.
#[derive(Clone, Copy)]
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["categories", "posts", "post_words"])?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &NewPost) -> RepoResult<Post> {
        self.conn
            .execute(
                "INSERT INTO posts (category, title, content, is_public)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    post.category.as_str(),
                    post.title.as_str(),
                    post.content.as_str(),
                    bool_to_int(post.is_public),
                ],
            )
            .map_err(|err| match constraint_violation(&err) {
                Some(Constraint::ForeignKey) => RepoError::CategoryNotFound(post.category.clone()),
                _ => err.into(),
            })?;

        let id = self.conn.last_insert_rowid();
        self.get_post(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("post {id} missing after insert")))
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }
        Ok(None)
    }

    fn post_exists(&self, id: PostId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_posts(&self, filter: PostFilter) -> RepoResult<Vec<Post>> {
        let sql = match filter {
            PostFilter::All => format!("{POST_SELECT_SQL} ORDER BY created_at ASC, id ASC;"),
            PostFilter::PublicOnly => {
                format!("{POST_SELECT_SQL} WHERE is_public = 1 ORDER BY created_at ASC, id ASC;")
            }
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }

    fn set_post_visibility(&self, id: PostId, is_public: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE posts SET is_public = ?2 WHERE id = ?1;",
            params![id, bool_to_int(is_public)],
        )?;
        if changed == 0 {
            return Err(RepoError::PostNotFound(id));
        }
        Ok(())
    }

    fn replace_post_words(&self, id: PostId, words: &[WordStat]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists: Option<i64> = tx
            .query_row("SELECT id FROM posts WHERE id = ?1;", [id], |row| row.get(0))
            .optional()?;
        if exists.is_none() {
            return Err(RepoError::PostNotFound(id));
        }

        tx.execute("DELETE FROM post_words WHERE post_id = ?1;", [id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO post_words (post_id, word, occurrences)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (post_id, word)
                 DO UPDATE SET occurrences = occurrences + excluded.occurrences;",
            )?;
            for stat in words.iter().filter(|stat| stat.occurrences > 0) {
                insert.execute(params![id, stat.word.as_str(), stat.occurrences])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn list_post_words(&self, id: PostId) -> RepoResult<Vec<WordStat>> {
        let mut stmt = self.conn.prepare(
            "SELECT word, occurrences
             FROM post_words
             WHERE post_id = ?1
             ORDER BY occurrences DESC, word ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut words = Vec::new();
        while let Some(row) = rows.next()? {
            words.push(WordStat {
                word: row.get("word")?,
                occurrences: row.get("occurrences")?,
            });
        }
        // SQLite collation and Rust `Ord` may disagree on non-ASCII words.
        sort_word_stats(&mut words);
        Ok(words)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    Ok(Post {
        id: row.get("id")?,
        category: row.get("category")?,
        title: row.get("title")?,
        content: row.get("content")?,
        is_public: int_to_bool(row.get("is_public")?, "posts.is_public")?,
        created_at: row.get("created_at")?,
    })
}
