use log::warn;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local single-user session. A `.env`
/// file in the working directory is honoured (see `main.rs`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file backing the saved-card store.
    pub database_path: PathBuf,
    /// Root directory for saved-card image blobs.
    pub asset_dir: PathBuf,
    /// Upper bound on the wait before capturing a black-box render target.
    pub render_settle: Duration,
    /// Resolution multiplier passed to the render capability.
    pub render_scale: u32,
    /// Maximum number of validation lines surfaced individually.
    pub warning_display_limit: usize,
    /// Deflate level used when packaging the archive.
    pub compression_level: i64,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default           |
    /// |-----------------------------|-------------------|
    /// | `HOST`                      | `127.0.0.1`       |
    /// | `PORT`                      | `8080`            |
    /// | `DATABASE_PATH`             | `idcards.sqlite`  |
    /// | `ASSET_DIR`                 | `assets`          |
    /// | `RENDER_SETTLE_MS`          | `300`             |
    /// | `RENDER_SCALE`              | `2`               |
    /// | `WARNING_DISPLAY_LIMIT`     | `5`               |
    /// | `ARCHIVE_COMPRESSION_LEVEL` | `6`               |
    /// | `MAX_UPLOAD_MB`             | `10`              |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_upload_mb: usize = env_or("MAX_UPLOAD_MB", 10);
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            database_path: std::env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            asset_dir: std::env::var("ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.asset_dir),
            render_settle: Duration::from_millis(env_or("RENDER_SETTLE_MS", 300)),
            render_scale: env_or::<u32>("RENDER_SCALE", defaults.render_scale).clamp(1, 4),
            warning_display_limit: env_or("WARNING_DISPLAY_LIMIT", defaults.warning_display_limit),
            compression_level: env_or::<i64>("ARCHIVE_COMPRESSION_LEVEL", defaults.compression_level)
                .clamp(0, 9),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("idcards.sqlite"),
            asset_dir: PathBuf::from("assets"),
            render_settle: Duration::from_millis(300),
            render_scale: 2,
            warning_display_limit: 5,
            compression_level: 6,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when it is unset or
/// unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value {:?} for {}", raw, key);
            default
        }),
        Err(_) => default,
    }
}
