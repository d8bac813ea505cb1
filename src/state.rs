use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::store::google_auth::TokenProvider;
use crate::store::mysql::init_db;
use crate::store::{MemoryStore, MySqlStore, SheetsStore, Store, StoreBackend};

/// Shared handler state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub default_kiosk_id: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, default_kiosk_id: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            default_kiosk_id: default_kiosk_id.into(),
        }
    }

    /// Builds the configured backend and checks it is reachable.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn Store> = match config.store_backend {
            StoreBackend::Sheets => {
                let http = reqwest::Client::new();
                let credentials = config
                    .google_credentials_json
                    .as_deref()
                    .context("Missing GOOGLE_CREDENTIALS_JSON environment variable")?;
                let spreadsheet_id = config
                    .spreadsheet_id
                    .as_deref()
                    .context("Missing SPREADSHEET_ID environment variable")?;

                let tokens = TokenProvider::from_json(credentials, http.clone())?;
                let sheets = SheetsStore::new(http, &config.sheets_api_base, spreadsheet_id, tokens);
                sheets
                    .ensure_headers()
                    .await
                    .context("Spreadsheet is not reachable")?;
                Arc::new(sheets)
            }
            StoreBackend::MySql => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set")?;
                let mysql = MySqlStore::new(init_db(url).await?);
                mysql.ensure_schema().await?;
                Arc::new(mysql)
            }
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        info!(backend = %config.store_backend, timezone = %config.timezone, "Store ready");

        Ok(Self::new(
            store,
            Arc::new(SystemClock::new(config.timezone)),
            config.default_kiosk_id.clone(),
        ))
    }
}
