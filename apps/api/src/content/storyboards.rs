//! Saved storyboards. The generated image is copied into the bucket on save
//! because generation-service image URLs expire.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::baas::models::Document;
use crate::baas::storage::file_id_from_view_url;
use crate::baas::{Collection, DocumentStore, FileStore, Query};
use crate::errors::AppError;
use crate::generation::models::{StoryboardBoards, StoryboardScene};
use crate::generation::{GenerationClient, DEFAULT_IMAGE_TYPE};
use crate::models::content::StoryboardRecord;
use crate::models::{self, now_iso};

const TITLE_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardView {
    #[serde(rename = "$id")]
    pub id: String,
    pub chapter_id: String,
    pub space_id: String,
    pub user_id: String,
    pub title: String,
    pub boards: Vec<StoryboardScene>,
    pub total_boards: usize,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<Document<StoryboardRecord>> for StoryboardView {
    fn from(doc: Document<StoryboardRecord>) -> Self {
        let image_url = doc.data.image_url().map(String::from);
        let StoryboardRecord {
            chapter_id,
            space_id,
            user_id,
            title,
            boards,
            created_at,
            ..
        } = doc.data;
        Self {
            id: doc.id,
            chapter_id,
            space_id,
            user_id,
            title,
            total_boards: boards.total_boards,
            boards: boards.storyboards,
            image_url,
            created_at,
        }
    }
}

/// Title shown for a saved storyboard: the first 50 characters of the
/// description followed by `...`.
pub fn storyboard_title(description: &str) -> String {
    let head: String = description.chars().take(TITLE_CHARS).collect();
    format!("{head}...")
}

/// Position within a storyboard's scenes. Moving past either end stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCursor {
    index: usize,
    len: usize,
}

impl SceneCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Cursor at `index`, clamped to the last scene.
    pub fn at(len: usize, index: usize) -> Self {
        let mut cursor = Self::new(len);
        cursor.index = index.min(len.saturating_sub(1));
        cursor
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        if self.index + 1 < self.len {
            self.index += 1;
        }
        self.index
    }

    pub fn previous(&mut self) -> usize {
        self.index = self.index.saturating_sub(1);
        self.index
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.len
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }
}

fn storyboards(store: &dyn DocumentStore) -> Collection<'_, StoryboardRecord> {
    Collection::new(store, models::STORYBOARDS)
}

/// Storyboards of a chapter, newest first.
pub async fn list_storyboards(
    store: &dyn DocumentStore,
    chapter_id: &str,
) -> Result<Vec<StoryboardView>, AppError> {
    let docs = storyboards(store)
        .list(&[
            Query::equal("chapterId", chapter_id),
            Query::order_desc("createdAt"),
        ])
        .await?;
    Ok(docs.into_iter().map(StoryboardView::from).collect())
}

pub async fn get_storyboard(
    store: &dyn DocumentStore,
    storyboard_id: &str,
) -> Result<StoryboardView, AppError> {
    Ok(storyboards(store).get(storyboard_id).await?.into())
}

pub struct NewStoryboard<'a> {
    pub user_id: &'a str,
    pub chapter_id: &'a str,
    pub space_id: &'a str,
    pub description: &'a str,
    /// Image URL returned by the generation service.
    pub image_url: &'a str,
    pub scenes: Vec<StoryboardScene>,
}

/// Copies the generated image into the bucket and stores the storyboard
/// pointing at the copy.
pub async fn save_storyboard(
    store: &dyn DocumentStore,
    files: &dyn FileStore,
    generation: &GenerationClient,
    new: NewStoryboard<'_>,
) -> Result<StoryboardView, AppError> {
    if new.scenes.is_empty() {
        return Err(AppError::Validation("No storyboard to save".to_string()));
    }
    if new.image_url.trim().is_empty() {
        return Err(AppError::Validation("Storyboard image URL is required".to_string()));
    }

    let image = generation.download(new.image_url.trim()).await?;
    if !(200..300).contains(&image.status) {
        return Err(AppError::Upstream {
            status: image.status,
            message: "Failed to download image".to_string(),
        });
    }
    let file_name = format!("storyboard_{}.png", Utc::now().timestamp_millis());
    let file = files
        .create_file(&file_name, DEFAULT_IMAGE_TYPE, image.bytes)
        .await?;
    let view_url = files.file_view_url(&file.id);

    let record = StoryboardRecord {
        chapter_id: new.chapter_id.to_string(),
        space_id: new.space_id.to_string(),
        user_id: new.user_id.to_string(),
        title: storyboard_title(new.description),
        boards: StoryboardBoards::new(view_url.clone(), new.scenes),
        image: view_url,
        created_at: now_iso(),
    };
    let doc = storyboards(store).create(&record, &[]).await?;
    info!("Saved storyboard {} with image file {}", doc.id, file.id);
    Ok(doc.into())
}

/// Deletes a storyboard. Removing its image file is best effort; the
/// document is deleted even if that fails.
pub async fn delete_storyboard(
    store: &dyn DocumentStore,
    files: &dyn FileStore,
    storyboard_id: &str,
) -> Result<(), AppError> {
    let collection = storyboards(store);
    let doc = collection.get(storyboard_id).await?;

    if let Some(file_id) = doc.data.image_url().and_then(file_id_from_view_url) {
        if let Err(e) = files.delete_file(file_id).await {
            warn!("Could not delete image {file_id} of storyboard {storyboard_id}: {e}");
        }
    }

    collection.delete(storyboard_id).await?;
    Ok(())
}
