use crate::baas::models::Document;
use crate::baas::{Collection, DocumentStore, Query};
use crate::errors::AppError;
use crate::models::content::SummaryRecord;
use crate::models::{self, now_iso};

fn summaries(store: &dyn DocumentStore) -> Collection<'_, SummaryRecord> {
    Collection::new(store, models::SUMMARIES)
}

pub async fn list_summaries(
    store: &dyn DocumentStore,
    chapter_id: &str,
    space_id: &str,
) -> Result<Vec<Document<SummaryRecord>>, AppError> {
    Ok(summaries(store)
        .list(&[
            Query::equal("chapterId", chapter_id),
            Query::equal("spaceId", space_id),
            Query::order_desc("createdAt"),
        ])
        .await?)
}

pub async fn save_summary(
    store: &dyn DocumentStore,
    user_id: &str,
    chapter_id: &str,
    space_id: &str,
    title: &str,
    summary: &str,
    url: &str,
) -> Result<Document<SummaryRecord>, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation(
            "Please enter a title for the summary".to_string(),
        ));
    }
    let record = SummaryRecord {
        title: title.to_string(),
        summary: summary.to_string(),
        url: url.trim().to_string(),
        space_id: space_id.to_string(),
        chapter_id: chapter_id.to_string(),
        user_id: user_id.to_string(),
        created_at: now_iso(),
    };
    Ok(summaries(store).create(&record, &[]).await?)
}

pub async fn delete_summary(store: &dyn DocumentStore, summary_id: &str) -> Result<(), AppError> {
    summaries(store).delete(summary_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryStore;

    #[tokio::test]
    async fn test_title_is_required_and_trimmed() {
        let store = MemoryStore::default();
        assert!(matches!(
            save_summary(&store, "u1", "c1", "s1", "   ", "text", "").await,
            Err(AppError::Validation(_))
        ));

        let saved = save_summary(&store, "u1", "c1", "s1", " Key ideas ", "text", " https://x.example ")
            .await
            .unwrap();
        assert_eq!(saved.data.title, "Key ideas");
        assert_eq!(saved.data.url, "https://x.example");

        delete_summary(&store, &saved.id).await.unwrap();
        assert!(list_summaries(&store, "c1", "s1").await.unwrap().is_empty());
    }
}
