use std::path::PathBuf;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
pub type DbPool = Pool<SqliteConnectionManager>;

/// Shared, read-only state handed to every request handler.
pub struct AppState {
    pub upload_dir: PathBuf,
}

pub mod config;
pub mod errors;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
