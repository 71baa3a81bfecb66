use anyhow::Context;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::baas::models::Document;
use crate::baas::{Collection, DocumentStore, Query};
use crate::content::chapters::get_chapter;
use crate::errors::AppError;
use crate::generation::models::Flashcard;
use crate::models::content::FlashcardSetRecord;
use crate::models::{self, now_iso};

/// A flashcard set with its cards decoded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSetView {
    #[serde(rename = "$id")]
    pub id: String,
    pub chapter_id: String,
    pub title: String,
    pub cards: Vec<Flashcard>,
    pub created_at: String,
    pub created_by: String,
}

impl From<Document<FlashcardSetRecord>> for FlashcardSetView {
    fn from(doc: Document<FlashcardSetRecord>) -> Self {
        let FlashcardSetRecord {
            chapter_id,
            title,
            cards,
            created_at,
            created_by,
        } = doc.data;
        Self {
            id: doc.id,
            chapter_id,
            title,
            cards,
            created_at,
            created_by,
        }
    }
}

fn sets(store: &dyn DocumentStore) -> Collection<'_, FlashcardSetRecord> {
    Collection::new(store, models::FLASHCARDS)
}

/// Sets of a chapter, newest first.
pub async fn list_sets(
    store: &dyn DocumentStore,
    chapter_id: &str,
) -> Result<Vec<FlashcardSetView>, AppError> {
    let docs = sets(store)
        .list(&[
            Query::equal("chapterId", chapter_id),
            Query::order_desc("createdAt"),
        ])
        .await?;
    Ok(docs.into_iter().map(FlashcardSetView::from).collect())
}

/// Stores a generated set. The title defaults to `Flashcards for <chapter>`.
pub async fn save_set(
    store: &dyn DocumentStore,
    user_id: &str,
    chapter_id: &str,
    title: Option<&str>,
    cards: Vec<Flashcard>,
) -> Result<FlashcardSetView, AppError> {
    if cards.is_empty() {
        return Err(AppError::Validation("No flashcards to save".to_string()));
    }
    let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => format!("Flashcards for {}", get_chapter(store, chapter_id).await?.data.name),
    };

    let record = FlashcardSetRecord {
        chapter_id: chapter_id.to_string(),
        title,
        cards,
        created_at: now_iso(),
        created_by: user_id.to_string(),
    };
    let doc = sets(store).create(&record, &[]).await?;
    info!("Saved {} flashcards as set {}", doc.data.cards.len(), doc.id);
    Ok(doc.into())
}

pub async fn rename_set(
    store: &dyn DocumentStore,
    set_id: &str,
    title: &str,
) -> Result<FlashcardSetView, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    Ok(sets(store).update(set_id, json!({ "title": title })).await?.into())
}

async fn rewrite_cards(
    store: &dyn DocumentStore,
    set_id: &str,
    edit: impl FnOnce(&mut Vec<Flashcard>) -> Result<(), AppError>,
) -> Result<FlashcardSetView, AppError> {
    let collection = sets(store);
    let mut cards = collection.get(set_id).await?.data.cards;
    edit(&mut cards)?;
    let encoded = serde_json::to_string(&cards).context("encoding flashcards")?;
    Ok(collection
        .update(set_id, json!({ "cards": encoded }))
        .await?
        .into())
}

fn card_not_found() -> AppError {
    AppError::NotFound("Flashcard not found".to_string())
}

/// Replaces the question and answer of the card at `index`.
pub async fn update_card(
    store: &dyn DocumentStore,
    set_id: &str,
    index: usize,
    card: Flashcard,
) -> Result<FlashcardSetView, AppError> {
    rewrite_cards(store, set_id, |cards| {
        let slot = cards.get_mut(index).ok_or_else(card_not_found)?;
        *slot = card;
        Ok(())
    })
    .await
}

/// Removes the card at `index`; the remaining cards keep their order.
pub async fn delete_card(
    store: &dyn DocumentStore,
    set_id: &str,
    index: usize,
) -> Result<FlashcardSetView, AppError> {
    rewrite_cards(store, set_id, |cards| {
        if index >= cards.len() {
            return Err(card_not_found());
        }
        cards.remove(index);
        Ok(())
    })
    .await
}

pub async fn delete_set(store: &dyn DocumentStore, set_id: &str) -> Result<(), AppError> {
    sets(store).delete(set_id).await?;
    Ok(())
}
