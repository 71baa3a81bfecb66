//! Website import: crawl a site for candidate pages, then turn one page into
//! study notes.

use axum::{extract::State, Json};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::models::{normalize_source_url, Notes};
use crate::generation::{Endpoint, GenerationClient, GenerationError};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitePage {
    pub url: String,
    pub title: String,
}

/// Display title for a crawled page, derived from its last path segment.
/// Unparsable input is returned as-is.
pub fn page_title(page_url: &str) -> String {
    let Ok(url) = Url::parse(page_url) else {
        return page_url.to_string();
    };
    if url.path() == "/" {
        return "Home".to_string();
    }
    let Some(last) = url.path().split('/').filter(|s| !s.is_empty()).last() else {
        return page_url.to_string();
    };

    let spaced = last.replace(['_', '-'], " ");
    let stripped = spaced
        .strip_suffix(".html")
        .or_else(|| spaced.strip_suffix(".htm"))
        .unwrap_or(&spaced);

    stripped
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn source_url(input: &str) -> Result<String, AppError> {
    normalize_source_url(input).ok_or_else(|| AppError::Validation("URL is required".to_string()))
}

fn no_links() -> AppError {
    AppError::NotFound("No links found. The provided URL has no crawlable links.".to_string())
}

/// Crawls `url` and returns the discovered pages with display titles.
pub async fn map_site(client: &GenerationClient, url: &str) -> Result<Vec<SitePage>, AppError> {
    let url = source_url(url)?;

    let data = match client.call(Endpoint::Sitemap, &json!({ "url": url })).await {
        Ok(data) => data,
        Err(GenerationError::Upstream { message, .. }) if message.contains("No URLs found") => {
            return Err(no_links());
        }
        Err(e) => return Err(e.into()),
    };

    let pages: Vec<SitePage> = data
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r.as_str().or_else(|| r.get("url").and_then(Value::as_str)))
                .map(|u| SitePage {
                    url: u.to_string(),
                    title: page_title(u),
                })
                .collect()
        })
        .unwrap_or_default();

    if pages.is_empty() {
        warn!("Sitemap for {url} returned no pages");
        return Err(no_links());
    }
    info!("Mapped {} pages from {url}", pages.len());
    Ok(pages)
}

/// Generates study notes for a single page.
pub async fn generate_notes(client: &GenerationClient, url: &str) -> Result<Notes, AppError> {
    let url = source_url(url)?;
    let data = client.call(Endpoint::Notes, &json!({ "url": url })).await?;
    let notes = data
        .get("notes")
        .cloned()
        .ok_or_else(|| GenerationError::InvalidResponse("missing notes".to_string()))?;
    Ok(serde_json::from_value(notes).map_err(GenerationError::from)?)
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub url: String,
}

/// POST /api/v1/import/pages
pub async fn handle_import_pages(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<Value>, AppError> {
    let pages = map_site(&state.generation, &req.url).await?;
    Ok(Json(json!({ "pages": pages })))
}

/// POST /api/v1/import/notes
pub async fn handle_import_notes(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<Value>, AppError> {
    let url = source_url(&req.url)?;
    let notes = generate_notes(&state.generation, &url).await?;
    Ok(Json(json!({ "notes": notes, "sourceUrl": url })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_util::{spawn_upstream, UNREACHABLE};
    use axum::{http::StatusCode, routing::post, Router};
    use std::time::Duration;

    #[test]
    fn test_page_title_root_is_home() {
        assert_eq!(page_title("https://docs.example.com/"), "Home");
        assert_eq!(page_title("https://docs.example.com"), "Home");
    }

    #[test]
    fn test_page_title_from_last_segment() {
        assert_eq!(
            page_title("https://example.com/guide/getting_started-now.html"),
            "Getting Started Now"
        );
        assert_eq!(page_title("https://example.com/a/intro/"), "Intro");
        assert_eq!(page_title("https://example.com/faq.htm"), "Faq");
    }

    #[test]
    fn test_page_title_unparsable_is_returned_verbatim() {
        assert_eq!(page_title("not a url"), "not a url");
    }

    #[tokio::test]
    async fn test_map_site_titles_results() {
        let upstream = spawn_upstream(Router::new().route(
            "/tavily-map",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["url"], "https://example.com");
                Json(json!({"status": "success", "data": {"results": [
                    "https://example.com/",
                    "https://example.com/cell-biology"
                ]}}))
            }),
        ))
        .await;
        let client = GenerationClient::new(&upstream, Duration::from_secs(5));

        let pages = map_site(&client, "example.com").await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Home");
        assert_eq!(pages[1].title, "Cell Biology");
    }

    #[tokio::test]
    async fn test_map_site_no_urls_is_not_found() {
        let upstream = spawn_upstream(Router::new().route(
            "/tavily-map",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"status": "error", "message": "No URLs found for site"})),
                )
            }),
        ))
        .await;
        let client = GenerationClient::new(&upstream, Duration::from_secs(5));

        let err = map_site(&client, "https://empty.example").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_map_site_empty_results_is_not_found() {
        let upstream = spawn_upstream(Router::new().route(
            "/tavily-map",
            post(|| async { Json(json!({"status": "success", "data": {"results": []}})) }),
        ))
        .await;
        let client = GenerationClient::new(&upstream, Duration::from_secs(5));

        let err = map_site(&client, "https://empty.example").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_import_notes_returns_url_sent_upstream() {
        let upstream = spawn_upstream(Router::new().route(
            "/generate-notes",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"status": "success", "data": {"notes": {
                    "title": body["url"],
                    "key_points": ["one"]
                }}}))
            }),
        ))
        .await;
        let state = AppState::from_config(Config::for_tests(&upstream, UNREACHABLE));

        let Json(reply) = handle_import_notes(
            State(state),
            Json(ImportRequest {
                url: "  example.com/page ".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(reply["sourceUrl"], "https://example.com/page");
        assert_eq!(reply["notes"]["title"], "https://example.com/page");
    }

    #[tokio::test]
    async fn test_generate_notes_unreachable_is_generation_error() {
        let client = GenerationClient::new(UNREACHABLE, Duration::from_secs(5));
        let err = generate_notes(&client, "example.com/page").await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }
}
