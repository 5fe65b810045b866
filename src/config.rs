use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Directory watched for reload signal files written by the web admin.
    pub signal_dir: PathBuf,
    /// Directory where nightly database backups are placed.
    pub backup_dir: PathBuf,
    /// Telegram id seeded as the first admin, if provided.
    pub admin_telegram_id: Option<i64>,
    pub admin_name: String,
    /// Chat id of the broadcast channel for `channel`-audience posts.
    pub post_channel_id: Option<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "sqlite:./data/shop.db".to_string());

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let signal_dir = env::var("SIGNAL_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let backup_dir = env::var("BACKUP_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/backups"));

        let admin_telegram_id = match env::var("ADMIN_TELEGRAM_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid ADMIN_TELEGRAM_ID"))?,
            ),
            _ => None,
        };

        let admin_name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string());

        let post_channel_id = match env::var("POST_CHANNEL_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid POST_CHANNEL_ID"))?,
            ),
            _ => None,
        };

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            signal_dir,
            backup_dir,
            admin_telegram_id,
            admin_name,
            post_channel_id,
        })
    }

    /// Filesystem path of the SQLite database, for the backup job.
    pub fn sqlite_path(&self) -> Option<PathBuf> {
        self.database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))
            .map(PathBuf::from)
    }
}
