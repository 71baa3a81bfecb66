//! Pass-through POST routes in front of the generation service.
//!
//! Success: upstream status and JSON body, byte-for-byte.
//! Upstream non-success: upstream status, `{status: "error", message}`.
//! Unreadable request, unreachable or unparsable upstream: 500 with a generic
//! message.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::IgnoredAny, Deserialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::generation::models::is_truthy;
use crate::generation::{Endpoint, GenerationClient, GenerationError};
use crate::state::AppState;

/// Failure replies of the proxy routes, each with its own envelope.
#[derive(Debug)]
pub enum ProxyFailure {
    /// Request rejected before any upstream call.
    BadRequest(String),
    /// Request body missing or not JSON. Answered like `Unreachable`.
    InvalidBody(Endpoint),
    /// Upstream answered with a non-success status.
    Upstream { status: u16, message: String },
    /// Upstream could not be reached or replied with something unreadable.
    Unreachable(Endpoint),
    TimedOut,
    DownloadFailed,
}

fn error_envelope(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        match self {
            ProxyFailure::BadRequest(message) => error_envelope(StatusCode::BAD_REQUEST, message),
            ProxyFailure::Upstream { status, message } => error_envelope(status_code(status), message),
            ProxyFailure::Unreachable(Endpoint::Audiobook)
            | ProxyFailure::InvalidBody(Endpoint::Audiobook) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to connect to audiobook service" })),
            )
                .into_response(),
            ProxyFailure::Unreachable(endpoint) | ProxyFailure::InvalidBody(endpoint) => {
                error_envelope(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!(
                        "Failed to connect to {} service. Please try again later.",
                        endpoint.service_name()
                    ),
                )
            }
            ProxyFailure::TimedOut => error_envelope(
                StatusCode::GATEWAY_TIMEOUT,
                "Request timed out. The server is taking too long to respond. Please try again."
                    .to_string(),
            ),
            ProxyFailure::DownloadFailed => error_envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to download image. Please try again later.".to_string(),
            ),
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(bytes).is_ok()
}

/// Accepts any request body that parses as JSON, whatever its content type.
fn json_body(endpoint: Endpoint, body: Result<Bytes, BytesRejection>) -> Result<Bytes, ProxyFailure> {
    match body {
        Ok(bytes) if is_json(&bytes) => Ok(bytes),
        Ok(_) => {
            warn!("{} request body is not JSON", endpoint.path());
            Err(ProxyFailure::InvalidBody(endpoint))
        }
        Err(e) => {
            warn!("{} request body unreadable: {e}", endpoint.path());
            Err(ProxyFailure::InvalidBody(endpoint))
        }
    }
}

/// Forwards `body` and relays the reply according to the module contract.
async fn relay(client: &GenerationClient, endpoint: Endpoint, body: Bytes) -> Result<Response, ProxyFailure> {
    let forwarded = match client.forward(endpoint, body).await {
        Ok(f) => f,
        Err(GenerationError::Timeout) => {
            error!("{} timed out", endpoint.path());
            return Err(ProxyFailure::TimedOut);
        }
        Err(e) => {
            error!("{} generation proxy error: {e}", endpoint.service_name());
            return Err(ProxyFailure::Unreachable(endpoint));
        }
    };

    // The audiobook service's replies are relayed verbatim whatever the status.
    if endpoint == Endpoint::Audiobook || forwarded.is_success() {
        if !is_json(forwarded.text.as_bytes()) {
            error!("{} returned unreadable body", endpoint.path());
            return Err(ProxyFailure::Unreachable(endpoint));
        }
        return Ok((
            status_code(forwarded.status),
            [(header::CONTENT_TYPE, "application/json")],
            forwarded.text,
        )
            .into_response());
    }

    let message = forwarded
        .message()
        .unwrap_or_else(|| format!("Server error: {}", forwarded.status));
    Err(ProxyFailure::Upstream {
        status: forwarded.status,
        message,
    })
}

async fn pass_through(
    state: &AppState,
    endpoint: Endpoint,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    let body = json_body(endpoint, body)?;
    relay(&state.generation, endpoint, body).await
}

/// POST /api/flashcards
pub async fn handle_flashcards(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    pass_through(&state, Endpoint::Flashcards, body).await
}

/// POST /api/quiz
pub async fn handle_quiz(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    info!("Quiz generation requested");
    pass_through(&state, Endpoint::Quiz, body).await
}

/// POST /api/storyboards
///
/// Requires `description` and a non-zero `number_of_boards`.
pub async fn handle_storyboards(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    let body = json_body(Endpoint::Storyboards, body)?;
    let fields: Value = serde_json::from_slice(&body)
        .map_err(|_| ProxyFailure::InvalidBody(Endpoint::Storyboards))?;

    if !is_truthy(fields.get("description")) {
        return Err(ProxyFailure::BadRequest("Description is required".to_string()));
    }
    if !is_truthy(fields.get("number_of_boards")) {
        return Err(ProxyFailure::BadRequest(
            "Number of boards is required".to_string(),
        ));
    }
    relay(&state.generation, Endpoint::Storyboards, body).await
}

/// POST /api/audiobook
pub async fn handle_audiobook(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    pass_through(&state, Endpoint::Audiobook, body).await
}

/// POST /api/notes
pub async fn handle_notes(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    pass_through(&state, Endpoint::Notes, body).await
}

/// POST /api/sitemap
pub async fn handle_sitemap(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    pass_through(&state, Endpoint::Sitemap, body).await
}

/// POST /api/search
pub async fn handle_search(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    pass_through(&state, Endpoint::Search, body).await
}

#[derive(Debug, Deserialize)]
pub struct DownloadImageRequest {
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// POST /api/download-image
///
/// Fetches a remote image server-side and streams the bytes back with the
/// original content type.
pub async fn handle_download_image(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyFailure> {
    let req: DownloadImageRequest = body
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()))
        .map_err(|e| {
            warn!("Image download request unreadable: {e}");
            ProxyFailure::DownloadFailed
        })?;

    let image_url = req
        .image_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ProxyFailure::BadRequest("Image URL is required".to_string()))?;

    let downloaded = state.generation.download(&image_url).await.map_err(|e| {
        error!("Image download error: {e}");
        ProxyFailure::DownloadFailed
    })?;

    if !(200..300).contains(&downloaded.status) {
        return Err(ProxyFailure::Upstream {
            status: downloaded.status,
            message: "Failed to download image".to_string(),
        });
    }

    let length = downloaded.bytes.len().to_string();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, downloaded.content_type),
            (header::CONTENT_LENGTH, length),
        ],
        downloaded.bytes,
    )
        .into_response())
}
