// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::PathBuf;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Resolve the database file path
///
/// Uses the configured path when present, otherwise the application data
/// directory: {APP_DATA}/kvk-reporting/kvk.db
pub fn get_database_path(config: &DatabaseConfig) -> AppResult<PathBuf> {
    let path = match &config.path {
        Some(path) => path.clone(),
        None => {
            let app_data_dir = dirs::data_dir().ok_or_else(|| {
                AppError::Other("Could not determine app data directory".to_string())
            })?;
            app_data_dir.join("kvk-reporting").join("kvk.db")
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(path)
}

/// SQL name of the Unicode lower-casing function. SQLite's own `lower()`
/// and `NOCASE` only fold ASCII.
pub const FOLD_CASE_FN: &str = "fold_case";

/// Register the application's SQL functions on a fresh connection
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
}

/// Create a connection pool
///
/// - SQLite in WAL mode
/// - Foreign keys enabled
/// - Busy timeout from configuration
pub fn create_connection_pool(config: &DatabaseConfig) -> AppResult<ConnectionPool> {
    let db_path = get_database_path(config)?;
    log::info!("Opening database at {}", db_path.display());

    let busy_timeout = config.busy_timeout_ms;
    let manager = SqliteConnectionManager::file(&db_path).with_init(move |conn| {
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = {};",
            busy_timeout
        ))?;
        register_functions(conn)
    });

    Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))
}

/// Create a single-connection in-memory pool (for testing)
///
/// Every in-memory connection is its own database, so the pool holds
/// exactly one.
pub fn create_memory_pool() -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        register_functions(conn)
    });

    Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))
}

/// Get a connection from the pool
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Create a standalone in-memory connection (for testing)
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().map_err(AppError::Database)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(AppError::Database)?;
    register_functions(&conn)?;
    Ok(conn)
}
