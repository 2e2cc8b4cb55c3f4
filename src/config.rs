use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::env;
use config;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    // Populated from the .env file
    pub database_path: String,
    pub upload_path: String,
    pub allowed_origins: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Assembles the configuration from an arbitrary variable source.
    /// `from_env` feeds it the process environment after loading the .env file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = required_absolute_path(&lookup, "DATABASE_PATH")?;
        let upload_path = required_absolute_path(&lookup, "UPLOAD_PATH")?;

        // "*" lets any origin through the CORS layer.
        let allowed_origins = lookup("ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let builder = config::Config::builder()
            .set_default("web.host", "127.0.0.1")?
            .set_default("web.port", 8080_i64)?
            // Host/port may be overridden by the TOML file.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml).required(false))
            .set_override("database_path", database_path)?
            .set_override("upload_path", upload_path)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .build()?;

        builder.try_deserialize()
    }

    /// Returns the full path to the posts database file inside its own folder.
    pub fn posts_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("posts")
            .join("posts.db")
    }

    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.upload_path)
    }
}

fn required_absolute_path<F>(lookup: &F, key: &str) -> Result<String, config::ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or_else(|| config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", key
    )))?;

    if Path::new(&value).is_relative() {
        return Err(config::ConfigError::Message(format!(
            "FATAL: The '{}' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
            key, value
        )));
    }
    Ok(value)
}
