use std::env;

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::store::StoreBackend;
use crate::store::sheets::DEFAULT_API_BASE;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,

    pub store_backend: StoreBackend,
    pub spreadsheet_id: Option<String>,
    pub google_credentials_json: Option<String>,
    pub sheets_api_base: String,
    pub database_url: Option<String>,

    /// Zone that decides what "today" means for attendance
    pub timezone: Tz,
    pub default_kiosk_id: String,

    // Rate limiting
    pub rate_attendance_per_min: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend: StoreBackend = var_or("STORE_BACKEND", "sheets")
            .parse()
            .context("STORE_BACKEND must be one of sheets, mysql, memory")?;

        let timezone: Tz = var_or("ATTENDANCE_TIMEZONE", "Asia/Kolkata")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid ATTENDANCE_TIMEZONE: {e}"))?;

        let config = Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            api_prefix: var_or("API_PREFIX", "/api"),

            store_backend,
            spreadsheet_id: non_empty("SPREADSHEET_ID"),
            google_credentials_json: non_empty("GOOGLE_CREDENTIALS_JSON"),
            sheets_api_base: var_or("SHEETS_API_BASE", DEFAULT_API_BASE),
            database_url: non_empty("DATABASE_URL"),

            timezone,
            default_kiosk_id: var_or("DEFAULT_KIOSK_ID", "reception"),

            rate_attendance_per_min: var_or("RATE_ATTENDANCE_PER_MIN", "120")
                .parse()
                .context("RATE_ATTENDANCE_PER_MIN must be a number")?,

            log_dir: var_or("LOG_DIR", "logs"),
            log_level: var_or("LOG_LEVEL", "info")
                .parse()
                .context("LOG_LEVEL must be one of trace, debug, info, warn, error")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the chosen backend has what it needs.
    pub fn validate(&self) -> Result<()> {
        match self.store_backend {
            StoreBackend::Sheets => {
                if self.google_credentials_json.is_none() {
                    bail!("Missing GOOGLE_CREDENTIALS_JSON environment variable");
                }
                if self.spreadsheet_id.is_none() {
                    bail!("Missing SPREADSHEET_ID environment variable");
                }
            }
            StoreBackend::MySql => {
                if self.database_url.is_none() {
                    bail!("DATABASE_URL must be set for the mysql backend");
                }
            }
            StoreBackend::Memory => {}
        }
        Ok(())
    }

    /// In-memory configuration with the defaults above.
    pub fn local() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".into(),
            api_prefix: "/api".into(),
            store_backend: StoreBackend::Memory,
            spreadsheet_id: None,
            google_credentials_json: None,
            sheets_api_base: DEFAULT_API_BASE.into(),
            database_url: None,
            timezone: chrono_tz::Asia::Kolkata,
            default_kiosk_id: "reception".into(),
            rate_attendance_per_min: 120,
            log_dir: "logs".into(),
            log_level: tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_config_is_valid() {
        assert!(Config::local().validate().is_ok());
    }

    #[test]
    fn sheets_backend_requires_credentials_and_spreadsheet() {
        let mut cfg = Config::local();
        cfg.store_backend = StoreBackend::Sheets;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("GOOGLE_CREDENTIALS_JSON"));

        cfg.google_credentials_json = Some("{}".into());
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("SPREADSHEET_ID"));

        cfg.spreadsheet_id = Some("sheet".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn mysql_backend_requires_database_url() {
        let mut cfg = Config::local();
        cfg.store_backend = StoreBackend::MySql;
        assert!(cfg.validate().is_err());
        cfg.database_url = Some("mysql://localhost/attendance".into());
        assert!(cfg.validate().is_ok());
    }
}
