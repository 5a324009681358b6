//! Schema migrations for categories, posts, analytics and post words.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one.
//! - All pending migrations run in one transaction; a failure leaves the
//!   previous schema version in place.
//! - `PRAGMA user_version` always equals the last applied version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "categories_posts",
        sql: include_str!("0001_categories_posts.sql"),
    },
    Migration {
        version: 2,
        name: "analytics",
        sql: include_str!("0002_analytics.sql"),
    },
    Migration {
        version: 3,
        name: "post_words",
        sql: include_str!("0003_post_words.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let script = format!(
            "{}\nPRAGMA user_version = {};",
            migration.sql, migration.version
        );
        tx.execute_batch(&script)
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current, latest
    );
    Ok(())
}
