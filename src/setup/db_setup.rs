use crate::DbPool;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates the posts table and its indexes. Safe to run repeatedly.
pub fn setup_posts_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    log::debug!("Creating 'blog_posts' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS blog_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            meta_description TEXT,
            focus_keyword TEXT,
            url_keyword TEXT NOT NULL,
            image TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            topic TEXT,
            service TEXT,
            industry TEXT,
            priority TEXT NOT NULL DEFAULT 'normal',
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // Backs the validator's slug lookup: a racing duplicate fails the insert.
    tx.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_blog_posts_url_keyword ON blog_posts(url_keyword)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_blog_posts_priority ON blog_posts(priority)",
        [],
    )?;

    tx.commit()?;
    Ok(())
}

/// Opens (creating if needed) the SQLite file behind a connection pool.
pub fn init_pool(db_path: &Path) -> Result<DbPool, SetupError> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.busy_timeout(std::time::Duration::from_secs(5)));
    let pool = Pool::builder().build(manager)?;
    Ok(pool)
}

/// Builds the pool and makes sure the schema exists.
pub fn open_posts_db(db_path: &Path) -> Result<DbPool, SetupError> {
    let pool = init_pool(db_path)?;
    let mut conn = pool.get()?;
    setup_posts_db(&mut conn)?;
    Ok(pool)
}
