use crate::baas::models::Document;
use crate::baas::{Collection, DocumentStore, Query};
use crate::errors::AppError;
use crate::generation::models::Notes;
use crate::models::content::WebNoteRecord;
use crate::models;

fn webnotes(store: &dyn DocumentStore) -> Collection<'_, WebNoteRecord> {
    Collection::new(store, models::WEBNOTES)
}

/// Read, update and delete rights for the owning user only.
pub fn owner_permissions(user_id: &str) -> Vec<String> {
    ["read", "update", "delete"]
        .iter()
        .map(|action| format!("{action}(\"user:{user_id}\")"))
        .collect()
}

pub async fn list_webnotes(
    store: &dyn DocumentStore,
    user_id: &str,
) -> Result<Vec<Document<WebNoteRecord>>, AppError> {
    Ok(webnotes(store)
        .list(&[Query::equal("userId", user_id)])
        .await?)
}

pub async fn save_webnote(
    store: &dyn DocumentStore,
    user_id: &str,
    notes: Notes,
    source_url: &str,
) -> Result<Document<WebNoteRecord>, AppError> {
    let title = notes.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Notes title is required".to_string()));
    }
    let record = WebNoteRecord {
        user_id: user_id.to_string(),
        title: title.to_string(),
        detailed_summary: notes.detailed_summary,
        key_points: notes.key_points,
        source_url: source_url.trim().to_string(),
    };
    Ok(webnotes(store)
        .create(&record, &owner_permissions(user_id))
        .await?)
}

pub async fn delete_webnote(store: &dyn DocumentStore, note_id: &str) -> Result<(), AppError> {
    webnotes(store).delete(note_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryStore;
    use serde_json::json;

    fn notes(title: &str) -> Notes {
        Notes {
            title: title.to_string(),
            detailed_summary: "Summary".to_string(),
            key_points: vec!["one".to_string(), "two".to_string()],
        }
    }

    #[test]
    fn test_owner_permissions_format() {
        assert_eq!(
            owner_permissions("u7"),
            vec![
                r#"read("user:u7")"#,
                r#"update("user:u7")"#,
                r#"delete("user:u7")"#
            ]
        );
    }

    #[tokio::test]
    async fn test_saved_notes_are_owner_scoped() {
        let store = MemoryStore::default();
        let saved = save_webnote(&store, "u1", notes("Cells"), " https://bio.example/cells ")
            .await
            .unwrap();
        save_webnote(&store, "u2", notes("Atoms"), "https://chem.example")
            .await
            .unwrap();

        let stored = &store.documents(models::WEBNOTES)[0];
        assert_eq!(stored["$permissions"], json!(owner_permissions("u1")));
        assert_eq!(stored["sourceUrl"], "https://bio.example/cells");

        let mine = list_webnotes(&store, "u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].data.key_points.len(), 2);

        delete_webnote(&store, &saved.id).await.unwrap();
        assert!(list_webnotes(&store, "u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_untitled_notes_are_rejected() {
        let store = MemoryStore::default();
        assert!(matches!(
            save_webnote(&store, "u1", notes(" "), "https://x.example").await,
            Err(AppError::Validation(_))
        ));
    }
}
