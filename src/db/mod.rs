pub mod models;
pub mod posts;
pub mod users;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::state::DbPool;

/// Timestamps are stored as RFC 3339 UTC strings so they sort
/// lexicographically and serialize unchanged.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../../migrations/001_initial.sql"),
)];

pub fn create_pool(db_path: &Path) -> anyhow::Result<DbPool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas are per-connection, so they run for every connection the
    // pool opens. busy_timeout keeps concurrent writers from failing
    // fast with SQLITE_BUSY.
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )
    });
    let pool = Pool::builder().max_size(8).build(manager)?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    // Create migrations tracking table
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
pub fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    run_migrations(&pool).unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_pool_creates_db_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("sub/dir/test.db");
        let pool = create_pool(&db_path).unwrap();
        assert!(db_path.exists());
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn migrations_run_successfully() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let tables: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .filter_map(|r| r.ok())
                .collect()
        };
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"posts".to_string()));
        assert!(tables.contains(&"likes".to_string()));
        assert!(tables.contains(&"comments".to_string()));
    }

    #[test]
    fn migrations_are_idempotent() {
        let pool = test_pool();
        run_migrations(&pool).unwrap(); // Should not error on second run

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn email_uniqueness_enforced_by_schema() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES ('u1', 'Alice', 'a@x.com', 'hash', 'now')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES ('u2', 'Alice2', 'a@x.com', 'hash', 'now')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_like_rejected_by_unique_index() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES ('u1', 'Alice', 'a@x.com', 'hash', 'now');
             INSERT INTO posts (id, author_id, author_name, content, created_at, updated_at)
             VALUES ('p1', 'u1', 'Alice', 'hello', 'now', 'now');",
        )
        .unwrap();

        conn.execute(
            "INSERT INTO likes (id, post_id, user_id, created_at)
             VALUES ('l1', 'p1', 'u1', 'now')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO likes (id, post_id, user_id, created_at)
             VALUES ('l2', 'p1', 'u1', 'now')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn foreign_keys_enforced() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        // Inserting a post with a non-existent author should fail
        let result = conn.execute(
            "INSERT INTO posts (id, author_id, author_name, content, created_at, updated_at)
             VALUES ('p1', 'nonexistent-user', 'ghost', 'hello', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }
}
