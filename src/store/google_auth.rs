//! OAuth access tokens for a Google service account.
//!
//! The service account key is the JSON blob Google hands out. We sign a short
//! lived RS256 assertion with its private key and trade it at `token_uri` for a
//! bearer token, which is kept in a small TTL cache until shortly before it
//! expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{AppError, AppResult};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Google tokens live an hour; refresh well before that.
const TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(key: &ServiceAccountKey, scope: &str, issued_at: i64) -> Self {
        Self {
            iss: key.client_email.clone(),
            scope: scope.to_string(),
            aud: key.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    scope: String,
    cache: Cache<(), String>,
}

impl TokenProvider {
    pub fn from_json(credentials_json: &str, http: reqwest::Client) -> AppResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(credentials_json).map_err(|e| {
            AppError::transport(format!("Failed to decode service account credentials: {e}"))
        })?;
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::transport(format!("Invalid service account private key: {e}")))?;

        Ok(Self {
            http,
            key,
            signing_key,
            scope: SHEETS_SCOPE.to_string(),
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(TOKEN_TTL)
                .build(),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Bearer token for the Sheets API, fetched once per TTL window.
    pub async fn access_token(&self) -> AppResult<String> {
        self.cache
            .try_get_with((), self.fetch_token())
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    async fn fetch_token(&self) -> AppResult<String> {
        let claims = AssertionClaims::new(&self.key, &self.scope, Utc::now().timestamp());
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| AppError::transport(format!("Failed to sign token assertion: {e}")))?;

        debug!(client_email = %self.key.client_email, "Requesting access token");

        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(%status, body = %body, "Token exchange rejected");
            return Err(AppError::transport(format!(
                "Token exchange failed with status {status}"
            )));
        }

        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }
}
