//! Google Sheets append backend
//!
//! The client is built once per process: credentials, proxy, and timeout
//! are all fixed at construction time. Changing proxy environment variables
//! after the first append has no effect on the cached client.

use std::time::Duration;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;
use serde_json::json;

use crate::config::{self, ProxyConfig};
use crate::error::ToolError;
use crate::types::AppendOutcome;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
/// Spreadsheet-write scope only; nothing broader is requested.
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Internal retries on transient failures (connect errors, 429, 5xx).
const TRANSIENT_RETRIES: u32 = 2;

/// Service-account authenticated Sheets API client.
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    auth: Auth,
    base_url: String,
}

#[derive(Debug)]
enum Auth {
    ServiceAccount(CustomServiceAccount),
    #[cfg(test)]
    Fixed(String),
}

impl SheetsClient {
    /// Build the process-wide client: credential path from the environment,
    /// proxy resolved exactly once, fixed 30-second timeout.
    pub fn from_env() -> Result<Self, ToolError> {
        let key_path = config::service_account_path_from_env().ok_or_else(|| {
            ToolError::Configuration(
                "set GOOGLE_APPLICATION_CREDENTIALS or SERVICE_ACCOUNT_FILE to your service account JSON"
                    .to_string(),
            )
        })?;
        if !key_path.exists() {
            return Err(ToolError::NotFound(format!(
                "credential file not found: {}",
                key_path.display()
            )));
        }

        let account = CustomServiceAccount::from_file(&key_path)
            .map_err(|e| ToolError::Configuration(format!("invalid service account file: {e}")))?;

        // Ambient proxy variables are resolved here, once. The built client
        // never re-reads them.
        let proxy = ProxyConfig::from_env();
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy();
        match proxy {
            Some(p) => {
                tracing::info!(proxy = %p.endpoint(), "Sheets client using explicit proxy");
                let wired = p
                    .to_reqwest_proxy()
                    .map_err(|e| ToolError::Configuration(format!("invalid proxy: {e}")))?;
                builder = builder.proxy(wired);
            }
            None => tracing::debug!("Sheets client using direct connection"),
        }
        let http = builder
            .build()
            .map_err(|e| ToolError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            auth: Auth::ServiceAccount(account),
            base_url: SHEETS_BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_fixed_token(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()
            .unwrap();
        Self {
            http,
            auth: Auth::Fixed("test-token".to_string()),
            base_url: base_url.into(),
        }
    }

    async fn bearer_token(&self) -> Result<String, ToolError> {
        match &self.auth {
            Auth::ServiceAccount(account) => {
                let token = account
                    .token(&[SPREADSHEETS_SCOPE])
                    .await
                    .map_err(|e| ToolError::Upstream(format!("token acquisition failed: {e}")))?;
                Ok(token.as_str().to_string())
            }
            #[cfg(test)]
            Auth::Fixed(token) => Ok(token.clone()),
        }
    }

    /// Append `rows` after the last populated row of `range_name`, raw
    /// values, inserting rows rather than overwriting what lies below.
    pub async fn values_append(
        &self,
        spreadsheet_id: &str,
        range_name: &str,
        rows: &[Vec<String>],
    ) -> Result<AppendOutcome, ToolError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.base_url, spreadsheet_id, range_name
        );
        let token = self.bearer_token().await?;
        let body = json!({ "values": rows });

        let mut attempt = 0;
        let response = loop {
            let result = self
                .http
                .post(&url)
                .query(&[
                    ("valueInputOption", "RAW"),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await;

            match result {
                Ok(resp) if is_transient(resp.status()) && attempt < TRANSIENT_RETRIES => {
                    tracing::warn!(status = %resp.status(), attempt, "transient Sheets failure, retrying");
                }
                Ok(resp) => break resp,
                Err(err) if attempt < TRANSIENT_RETRIES => {
                    tracing::warn!(error = %err, attempt, "Sheets transport failure, retrying");
                }
                Err(err) => {
                    return Err(ToolError::Upstream(format!("Sheets request failed: {err}")))
                }
            }
            attempt += 1;
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::Upstream(format!(
                "Sheets error {}: {}",
                status, text
            )));
        }

        let parsed: AppendResponse = response.json().await?;
        let updated_rows = parsed
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(0);

        tracing::info!(spreadsheet_id, range = range_name, updated_rows, "Sheets append");

        Ok(AppendOutcome { updated_rows })
    }
}

fn is_transient(status: reqwest::StatusCode) -> bool {
    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

// Sheets values.append response types
#[derive(Debug, Deserialize)]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<u64>,
}
