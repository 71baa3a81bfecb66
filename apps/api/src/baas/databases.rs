//! Document storage: the `DocumentStore` seam and its BaaS implementation.
//!
//! Domain code depends on `&dyn DocumentStore` and reads/writes through a typed
//! [`Collection`], so it can be exercised against an in-memory store in tests.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::baas::models::{Document, DocumentList};
use crate::baas::query::{to_params, Query};
use crate::baas::{BaasClient, BaasError, UNIQUE_ID};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One page of matching documents plus the total match count.
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, BaasError>;

    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Value, BaasError>;

    async fn create_document(
        &self,
        collection: &str,
        data: Value,
        permissions: &[String],
    ) -> Result<Value, BaasError>;

    /// Partial update: only the given attributes change.
    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, BaasError>;

    async fn delete_document(&self, collection: &str, document_id: &str)
        -> Result<(), BaasError>;
}

impl BaasClient {
    fn documents_path(&self, collection: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.database_id(),
            collection
        )
    }
}

#[async_trait]
impl DocumentStore for BaasClient {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, BaasError> {
        let req = self
            .request(Method::GET, &self.documents_path(collection))
            .query(&to_params(queries));
        self.send_json(req).await
    }

    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Value, BaasError> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Value,
        permissions: &[String],
    ) -> Result<Value, BaasError> {
        let mut body = json!({ "documentId": UNIQUE_ID, "data": data });
        if !permissions.is_empty() {
            body["permissions"] = json!(permissions);
        }
        let req = self
            .request(Method::POST, &self.documents_path(collection))
            .json(&body);
        self.send_json(req).await
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, BaasError> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        let req = self
            .request(Method::PATCH, &path)
            .json(&json!({ "data": data }));
        self.send_json(req).await
    }

    async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<(), BaasError> {
        let path = format!("{}/{}", self.documents_path(collection), document_id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}

/// Page size requested when the caller sets no limit; the BaaS default is 25.
pub const LIST_LIMIT: u32 = 100;

fn with_default_limit(queries: &[Query]) -> Vec<Query> {
    let mut queries = queries.to_vec();
    if !queries.iter().any(|q| matches!(q, Query::Limit { .. })) {
        queries.push(Query::limit(LIST_LIMIT));
    }
    queries
}

/// Typed view over one collection.
pub struct Collection<'a, T> {
    store: &'a dyn DocumentStore,
    id: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T> Collection<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: &'a dyn DocumentStore, id: &'static str) -> Self {
        Self {
            store,
            id,
            _marker: PhantomData,
        }
    }

    /// First page (at most [`LIST_LIMIT`] unless the caller sets a limit).
    pub async fn list(&self, queries: &[Query]) -> Result<Vec<Document<T>>, BaasError> {
        self.store
            .list_documents(self.id, &with_default_limit(queries))
            .await?
            .documents
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(BaasError::from))
            .collect()
    }

    /// Number of documents matching the filters, beyond the first page too.
    pub async fn count(&self, queries: &[Query]) -> Result<usize, BaasError> {
        let mut queries = queries.to_vec();
        queries.retain(|q| !matches!(q, Query::Limit { .. }));
        queries.push(Query::limit(1));
        let list = self.store.list_documents(self.id, &queries).await?;
        Ok(list.total as usize)
    }

    /// Deletes every document matching the filters, one page at a time.
    /// Returns how many were removed.
    pub async fn delete_matching(&self, queries: &[Query]) -> Result<usize, BaasError> {
        let mut queries = queries.to_vec();
        queries.retain(|q| !matches!(q, Query::Limit { .. }));
        queries.push(Query::limit(LIST_LIMIT));

        let mut removed = 0;
        loop {
            let page = self.store.list_documents(self.id, &queries).await?.documents;
            for doc in &page {
                let id = doc["$id"].as_str().unwrap_or_default();
                self.store.delete_document(self.id, id).await?;
                removed += 1;
            }
            if page.len() < LIST_LIMIT as usize {
                return Ok(removed);
            }
        }
    }

    pub async fn get(&self, document_id: &str) -> Result<Document<T>, BaasError> {
        let doc = self.store.get_document(self.id, document_id).await?;
        Ok(serde_json::from_value(doc)?)
    }

    pub async fn create(&self, data: &T, permissions: &[String]) -> Result<Document<T>, BaasError> {
        let data = serde_json::to_value(data)?;
        let doc = self.store.create_document(self.id, data, permissions).await?;
        Ok(serde_json::from_value(doc)?)
    }

    pub async fn update(&self, document_id: &str, patch: Value) -> Result<Document<T>, BaasError> {
        let doc = self.store.update_document(self.id, document_id, patch).await?;
        Ok(serde_json::from_value(doc)?)
    }

    pub async fn delete(&self, document_id: &str) -> Result<(), BaasError> {
        self.store.delete_document(self.id, document_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baas::memory::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        #[serde(rename = "chapterId")]
        chapter_id: String,
        title: String,
    }

    fn note(chapter: &str, title: &str) -> Note {
        Note {
            chapter_id: chapter.to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_collection_create_then_list_filters() {
        let store = MemoryStore::default();
        let notes = Collection::<Note>::new(&store, "notes");
        notes.create(&note("c1", "a"), &[]).await.unwrap();
        notes.create(&note("c2", "b"), &[]).await.unwrap();

        let listed = notes.list(&[Query::equal("chapterId", "c1")]).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].data, note("c1", "a"));
        assert_eq!(notes.count(&[]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_uses_total_not_page_length() {
        let store = MemoryStore::default();
        let notes = Collection::<Note>::new(&store, "notes");
        let many = LIST_LIMIT as usize + 30;
        for i in 0..many {
            notes.create(&note("c1", &i.to_string()), &[]).await.unwrap();
        }

        assert_eq!(notes.list(&[]).await.unwrap().len(), LIST_LIMIT as usize);
        assert_eq!(notes.count(&[]).await.unwrap(), many);
        assert_eq!(
            notes.count(&[Query::equal("chapterId", "c1"), Query::limit(5)]).await.unwrap(),
            many
        );
    }

    #[tokio::test]
    async fn test_delete_matching_pages_until_empty() {
        let store = MemoryStore::default();
        let notes = Collection::<Note>::new(&store, "notes");
        for i in 0..(LIST_LIMIT * 2) {
            notes.create(&note("c1", &i.to_string()), &[]).await.unwrap();
        }
        notes.create(&note("c2", "kept"), &[]).await.unwrap();

        let removed = notes
            .delete_matching(&[Query::equal("chapterId", "c1")])
            .await
            .unwrap();

        assert_eq!(removed, LIST_LIMIT as usize * 2);
        assert_eq!(notes.count(&[]).await.unwrap(), 1);
    }

    #[test]
    fn test_default_limit_only_when_missing() {
        let added = with_default_limit(&[Query::equal("a", "1")]);
        assert_eq!(added.last(), Some(&Query::limit(LIST_LIMIT)));

        let kept = with_default_limit(&[Query::limit(5)]);
        assert_eq!(kept, vec![Query::limit(5)]);
    }

    #[tokio::test]
    async fn test_collection_update_is_partial() {
        let store = MemoryStore::default();
        let notes = Collection::<Note>::new(&store, "notes");
        let created = notes.create(&note("c1", "old"), &[]).await.unwrap();

        let updated = notes
            .update(&created.id, serde_json::json!({"title": "new"}))
            .await
            .unwrap();
        assert_eq!(updated.data.title, "new");
        assert_eq!(updated.data.chapter_id, "c1");
    }

    #[tokio::test]
    async fn test_collection_get_missing_is_not_found() {
        let store = MemoryStore::default();
        let notes = Collection::<Note>::new(&store, "notes");
        let err = notes.get("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
