//! Generation client: the single point of entry for all calls to the external
//! content-generation service (flashcards, quizzes, storyboards, audiobooks,
//! notes, sitemap crawling, web search).
//!
//! No other module may call the generation service directly.
use std::time::Duration;

use bytes::Bytes;
use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;
pub mod import;
pub mod models;

/// Fallback content type for downloaded images without one.
pub const DEFAULT_IMAGE_TYPE: &str = "image/png";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Http(e)
        }
    }
}

/// Remote operations offered by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Flashcards,
    Quiz,
    Storyboards,
    Audiobook,
    Notes,
    Sitemap,
    Search,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Flashcards => "/generate-flashcards",
            Endpoint::Quiz => "/generate-quiz",
            Endpoint::Storyboards => "/generate-storyboards",
            Endpoint::Audiobook => "/audiobook-to-audio",
            Endpoint::Notes => "/generate-notes",
            Endpoint::Sitemap => "/tavily-map",
            Endpoint::Search => "/tavily-search",
        }
    }

    /// Human name used in user-facing failure messages.
    pub fn service_name(self) -> &'static str {
        match self {
            Endpoint::Flashcards => "flashcard generation",
            Endpoint::Quiz => "quiz generation",
            Endpoint::Storyboards => "storyboard generation",
            Endpoint::Audiobook => "audiobook",
            Endpoint::Notes => "notes generation",
            Endpoint::Sitemap => "sitemap",
            Endpoint::Search => "web search",
        }
    }
}

/// An upstream reply exactly as received.
#[derive(Debug)]
pub struct Forwarded {
    pub status: u16,
    pub text: String,
}

impl Forwarded {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.text)
    }

    /// The upstream's own error message, if its body carried one.
    pub fn message(&self) -> Option<String> {
        let body = self.json().ok()?;
        upstream_message(&body)
    }
}

/// A fetched remote file.
#[derive(Debug)]
pub struct Downloaded {
    pub status: u16,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Client for the generation service. Cheap to clone.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// POSTs the JSON body byte-for-byte and hands back the upstream status
    /// and body.
    pub async fn forward(&self, endpoint: Endpoint, body: Bytes) -> Result<Forwarded, GenerationError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!("{} returned {} ({} bytes)", endpoint.path(), status, text.len());
        Ok(Forwarded { status, text })
    }

    /// Calls an endpoint and returns the `data` member of a
    /// `{status: "success", data}` envelope.
    pub async fn call(&self, endpoint: Endpoint, body: &Value) -> Result<Value, GenerationError> {
        let forwarded = self.forward(endpoint, Bytes::from(serde_json::to_vec(body)?)).await?;
        if !forwarded.is_success() {
            let message = forwarded
                .message()
                .unwrap_or_else(|| format!("Server error: {}", forwarded.status));
            warn!("{} failed with {}: {}", endpoint.path(), forwarded.status, message);
            return Err(GenerationError::Upstream {
                status: forwarded.status,
                message,
            });
        }

        let envelope = forwarded.json()?;
        match envelope.get("status").and_then(Value::as_str) {
            Some("success") => envelope
                .get("data")
                .cloned()
                .ok_or_else(|| GenerationError::InvalidResponse("missing data".to_string())),
            Some("error") => Err(GenerationError::Upstream {
                status: 502,
                message: upstream_message(&envelope).unwrap_or_else(|| "Server error".to_string()),
            }),
            _ => Err(GenerationError::InvalidResponse(
                "Invalid response format from server".to_string(),
            )),
        }
    }

    /// Fetches a remote file (used for generated images).
    pub async fn download(&self, url: &str) -> Result<Downloaded, GenerationError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_IMAGE_TYPE)
            .to_string();
        let bytes = response.bytes().await?;
        Ok(Downloaded {
            status,
            content_type,
            bytes,
        })
    }
}

/// Error text from an upstream body: `message`, else `detail.error`.
fn upstream_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/detail/error").and_then(Value::as_str))
        .map(String::from)
}
