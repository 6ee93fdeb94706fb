// src/db/connection.rs
//
// Connection management for the cache store
//
// PRINCIPLES:
// - The store path is injected by the caller (no ambient global state)
// - Explicit connection pooling
// - Clear error propagation

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Create a connection pool for the cache store at `db_path`.
///
/// Pool configuration:
/// - Small pool; the batch loop is a single logical thread of control
/// - WAL mode so a crash mid-write cannot corrupt earlier entries
/// - Busy timeout to avoid immediate errors
pub fn create_connection_pool(db_path: &Path) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool with a better error message.
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get cache store connection: {}", e)))
}

/// Create an in-memory pool (for testing).
///
/// Capped at one connection so every caller sees the same in-memory
/// database.
#[cfg(test)]
pub fn create_test_pool() -> ConnectionPool {
    let manager = SqliteConnectionManager::memory();
    Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("in-memory pool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_creation_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_connection_pool(&dir.path().join("cache.db")).unwrap();
        let conn = get_connection(&pool).unwrap();

        let result: i32 = conn.query_row("SELECT 1 + 1", [], |row| row.get(0)).unwrap();
        assert_eq!(result, 2);
    }

    #[test]
    fn test_test_pool() {
        let pool = create_test_pool();
        let conn = pool.get().unwrap();

        let result: i32 = conn.query_row("SELECT 21 * 2", [], |row| row.get(0)).unwrap();
        assert_eq!(result, 42);
    }
}
