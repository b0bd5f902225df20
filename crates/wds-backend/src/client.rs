//! Stateless request wrapper for the warehouse backend.
//!
//! One method per backend operation; every call is a single
//! request/response exchange with no retry, backoff, or caching.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use wds_model::{ChatMessage, DimensionInsert, FactInsert, SchemaExport, TrainRequest};

use crate::error::{BackendError, Result};

/// Default warehouse service address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default conversational-agent webhook. The agent lives on a separate
/// service and takes `{sender, message}` bodies directly.
pub const DEFAULT_CHAT_URL: &str = "http://127.0.0.1:5005/webhooks/rest/webhook";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`BackendClient`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub chat_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_url: DEFAULT_CHAT_URL.to_string(),
        }
    }
}

/// Client for the warehouse backend and the conversational agent.
pub struct BackendClient {
    http: Client,
    base_url: String,
    chat_url: String,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(BackendError::from)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_url: config.chat_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and normalize the response. Non-2xx statuses become
    /// [`BackendError::Backend`] with a message extracted from the body
    /// when one is present.
    fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text().unwrap_or_default();
        debug!(status = status.as_u16(), "backend response");
        if !status.is_success() {
            return Err(BackendError::Backend {
                status: status.as_u16(),
                message: extract_error_message(status.as_u16(), &body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| BackendError::JsonParse(e.to_string()))
    }

    pub fn list_databases(&self) -> Result<Value> {
        self.execute(self.http.get(self.url("/get-databases")))
    }

    pub fn check_database(&self, name: &str) -> Result<Value> {
        self.execute(
            self.http
                .get(self.url("/check-database"))
                .query(&[("name", name)]),
        )
    }

    pub fn create_database(&self, export: &SchemaExport) -> Result<Value> {
        self.execute(
            self.http
                .post(self.url("/create-database-and-tables"))
                .json(export),
        )
    }

    pub fn delete_database(&self, name: &str) -> Result<Value> {
        self.execute(
            self.http
                .delete(self.url("/delete-database"))
                .query(&[("name", name)]),
        )
    }

    pub fn get_tables(&self, database: &str) -> Result<Value> {
        self.execute(
            self.http
                .get(self.url("/get-tables"))
                .query(&[("databaseName", database)]),
        )
    }

    pub fn insert_dimension(&self, body: &DimensionInsert) -> Result<Value> {
        self.execute(self.http.post(self.url("/insert-dimension-data")).json(body))
    }

    pub fn insert_fact(&self, body: &FactInsert) -> Result<Value> {
        self.execute(self.http.post(self.url("/insert-fact")).json(body))
    }

    pub fn delete_table(&self, database: &str, table: &str) -> Result<Value> {
        self.execute(
            self.http
                .delete(self.url("/delete-table"))
                .query(&[("database", database), ("table", table)]),
        )
    }

    pub fn send_chat_message(&self, message: &ChatMessage) -> Result<Value> {
        self.execute(self.http.post(&self.chat_url).json(message))
    }

    pub fn train_chatbot(&self, database: &str) -> Result<Value> {
        let body = TrainRequest {
            database: database.to_string(),
        };
        self.execute(self.http.post(self.url("/train-chatbot")).json(&body))
    }
}

/// Pull a human-readable message out of an error response body. The
/// backend puts it under `error` or `message`; anything else falls back
/// to a generic status line.
fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    format!("request failed with status {status}")
}
