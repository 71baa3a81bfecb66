use crate::baas::models::Document;
use crate::baas::{Collection, DocumentStore, Query};
use crate::errors::AppError;
use crate::models::content::AudiobookRecord;
use crate::models::{self, now_iso};

fn audiobooks(store: &dyn DocumentStore) -> Collection<'_, AudiobookRecord> {
    Collection::new(store, models::AUDIOBOOKS)
}

pub async fn list_audiobooks(
    store: &dyn DocumentStore,
    chapter_id: &str,
) -> Result<Vec<Document<AudiobookRecord>>, AppError> {
    Ok(audiobooks(store)
        .list(&[
            Query::equal("chapterId", chapter_id),
            Query::order_desc("createdAt"),
        ])
        .await?)
}

pub async fn save_audiobook(
    store: &dyn DocumentStore,
    chapter_id: &str,
    title: &str,
    file_url: &str,
    script: &str,
) -> Result<Document<AudiobookRecord>, AppError> {
    let (title, file_url) = (title.trim(), file_url.trim());
    if title.is_empty() || file_url.is_empty() {
        return Err(AppError::Validation(
            "Audiobook title and file URL are required".to_string(),
        ));
    }
    let record = AudiobookRecord {
        chapter_id: chapter_id.to_string(),
        title: title.to_string(),
        file_url: file_url.to_string(),
        script: script.to_string(),
        created_at: now_iso(),
    };
    Ok(audiobooks(store).create(&record, &[]).await?)
}

pub async fn delete_audiobook(store: &dyn DocumentStore, audiobook_id: &str) -> Result<(), AppError> {
    audiobooks(store).delete(audiobook_id).await?;
    Ok(())
}
