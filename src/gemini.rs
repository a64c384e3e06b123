/// Blocking client for the Google Generative Language REST API.
///
/// Shared by the remote embedder and the chat model. Requests are single
/// round trips with no retry.
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("$GOOGLE_API_KEY not set")]
    MissingApiKey,

    #[error("HTTP client build failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Connection settings plus a reusable HTTP client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("medibot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GeminiError::Client)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a client reading the key from `$GOOGLE_API_KEY`.
    pub fn from_env(base_url: &str, timeout: Duration) -> Result<Self, GeminiError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;
        Self::new(base_url, api_key, timeout)
    }

    /// Full URL for a model method, e.g. `models/gemini-2.0-flash:generateContent`.
    #[must_use]
    pub fn method_url(&self, model: &str, method: &str) -> String {
        format!("{}/{}:{method}", self.base_url, model_resource(model))
    }

    /// POST a JSON body and decode the JSON response.
    pub fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, GeminiError> {
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(|source| GeminiError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|source| GeminiError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| GeminiError::Malformed(e.to_string()))
    }
}

/// Normalize a model name to its `models/...` resource path.
#[must_use]
pub fn model_resource(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

/// Best-effort extraction of the message from an API error body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if parsed.error.status.is_empty() => parsed.error.message,
        Ok(parsed) => format!("{} ({})", parsed.error.message, parsed.error.status),
        Err(_) => body.trim().to_string(),
    }
}
