use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::baas::models::Document;
use crate::baas::{Collection, DocumentStore, Query};
use crate::content::{audiobooks, flashcards, quizzes, storyboards, summaries};
use crate::errors::AppError;
use crate::models::content::{AudiobookRecord, ChapterRecord, FlashcardSetRecord, SummaryRecord};
use crate::models::{self, now_iso};

fn chapters(store: &dyn DocumentStore) -> Collection<'_, ChapterRecord> {
    Collection::new(store, models::CHAPTERS)
}

fn chapter_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Chapter name is required".to_string()));
    }
    Ok(name)
}

pub async fn list_chapters(
    store: &dyn DocumentStore,
    space_id: &str,
) -> Result<Vec<Document<ChapterRecord>>, AppError> {
    Ok(chapters(store)
        .list(&[
            Query::equal("spaceId", space_id),
            Query::order_asc("createdAt"),
        ])
        .await?)
}

pub async fn get_chapter(
    store: &dyn DocumentStore,
    chapter_id: &str,
) -> Result<Document<ChapterRecord>, AppError> {
    Ok(chapters(store).get(chapter_id).await?)
}

pub async fn create_chapter(
    store: &dyn DocumentStore,
    user_id: &str,
    space_id: &str,
    name: &str,
    description: &str,
) -> Result<Document<ChapterRecord>, AppError> {
    let record = ChapterRecord {
        name: chapter_name(name)?.to_string(),
        description: description.trim().to_string(),
        space_id: space_id.to_string(),
        created_at: now_iso(),
        created_by: user_id.to_string(),
    };
    Ok(chapters(store).create(&record, &[]).await?)
}

pub async fn update_chapter(
    store: &dyn DocumentStore,
    chapter_id: &str,
    name: &str,
    description: &str,
) -> Result<Document<ChapterRecord>, AppError> {
    let patch = json!({
        "name": chapter_name(name)?,
        "description": description.trim(),
    });
    Ok(chapters(store).update(chapter_id, patch).await?)
}

/// Deletes the chapter's flashcard sets, then the chapter itself.
pub async fn delete_chapter(store: &dyn DocumentStore, chapter_id: &str) -> Result<(), AppError> {
    let removed = Collection::<FlashcardSetRecord>::new(store, models::FLASHCARDS)
        .delete_matching(&[Query::equal("chapterId", chapter_id)])
        .await?;
    chapters(store).delete(chapter_id).await?;
    info!("Deleted chapter {chapter_id} and {removed} flashcard set(s)");
    Ok(())
}

/// Everything shown on a chapter page.
#[derive(Debug, Serialize)]
pub struct ChapterContent {
    pub flashcards: Vec<flashcards::FlashcardSetView>,
    pub summaries: Vec<Document<SummaryRecord>>,
    pub quizzes: Vec<quizzes::QuizView>,
    pub audiobooks: Vec<Document<AudiobookRecord>>,
    pub storyboards: Vec<storyboards::StoryboardView>,
    /// Names of the lists that failed to load and are shown empty.
    pub warnings: Vec<String>,
}

fn or_empty<T>(name: &str, result: Result<Vec<T>, AppError>, warnings: &mut Vec<String>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("Failed to load {name}: {e}");
        warnings.push(name.to_string());
        Vec::new()
    })
}

/// Fetches all content lists of a chapter concurrently.
pub async fn chapter_content(
    store: &dyn DocumentStore,
    chapter_id: &str,
    space_id: &str,
) -> ChapterContent {
    let (fc, sm, qz, ab, sb) = tokio::join!(
        flashcards::list_sets(store, chapter_id),
        summaries::list_summaries(store, chapter_id, space_id),
        quizzes::list_quizzes(store, chapter_id, space_id),
        audiobooks::list_audiobooks(store, chapter_id),
        storyboards::list_storyboards(store, chapter_id),
    );

    let mut warnings = Vec::new();
    ChapterContent {
        flashcards: or_empty("flashcards", fc, &mut warnings),
        summaries: or_empty("summaries", sm, &mut warnings),
        quizzes: or_empty("quizzes", qz, &mut warnings),
        audiobooks: or_empty("audiobooks", ab, &mut warnings),
        storyboards: or_empty("storyboards", sb, &mut warnings),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryStore;

    #[tokio::test]
    async fn test_create_and_update_chapter() {
        let store = MemoryStore::default();
        let chapter = create_chapter(&store, "u1", "s1", "  Cells ", "Intro")
            .await
            .unwrap();
        assert_eq!(chapter.data.name, "Cells");
        assert_eq!(chapter.data.created_by, "u1");

        let updated = update_chapter(&store, &chapter.id, "Cell Biology", " More ")
            .await
            .unwrap();
        assert_eq!(updated.data.name, "Cell Biology");
        assert_eq!(updated.data.description, "More");
        assert_eq!(updated.data.space_id, "s1");

        assert!(matches!(
            create_chapter(&store, "u1", "s1", " ", "").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_chapter_cascades_to_its_flashcards_only() {
        let store = MemoryStore::default();
        let doomed = create_chapter(&store, "u1", "s1", "A", "").await.unwrap();
        let kept = create_chapter(&store, "u1", "s1", "B", "").await.unwrap();
        let card = vec![crate::generation::models::Flashcard {
            question: "Q".into(),
            answer: "A".into(),
        }];
        flashcards::save_set(&store, "u1", &doomed.id, None, card.clone()).await.unwrap();
        flashcards::save_set(&store, "u1", &doomed.id, None, card.clone()).await.unwrap();
        flashcards::save_set(&store, "u1", &kept.id, None, card).await.unwrap();

        delete_chapter(&store, &doomed.id).await.unwrap();

        let remaining = store.documents(models::FLASHCARDS);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["chapterId"], kept.id.as_str());
        assert_eq!(list_chapters(&store, "s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_chapter_removes_sets_past_first_page() {
        let store = MemoryStore::default();
        let chapter = create_chapter(&store, "u1", "s1", "Big", "").await.unwrap();
        for _ in 0..(crate::baas::databases::LIST_LIMIT as usize * 2 + 5) {
            store
                .create_document(models::FLASHCARDS, json!({"chapterId": chapter.id}), &[])
                .await
                .unwrap();
        }
        store
            .create_document(models::FLASHCARDS, json!({"chapterId": "other"}), &[])
            .await
            .unwrap();

        delete_chapter(&store, &chapter.id).await.unwrap();

        let remaining = store.documents(models::FLASHCARDS);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["chapterId"], "other");
    }

    #[tokio::test]
    async fn test_chapter_content_reports_failed_lists() {
        let store = MemoryStore::default();
        let chapter = create_chapter(&store, "u1", "s1", "A", "").await.unwrap();
        summaries::save_summary(&store, "u1", &chapter.id, "s1", "Title", "Body", "")
            .await
            .unwrap();
        store.fail_collection(models::QUIZZES);
        store.fail_collection(models::STORYBOARDS);

        let content = chapter_content(&store, &chapter.id, "s1").await;
        assert_eq!(content.summaries.len(), 1);
        assert!(content.quizzes.is_empty());
        assert_eq!(content.warnings, vec!["quizzes", "storyboards"]);
    }
}
