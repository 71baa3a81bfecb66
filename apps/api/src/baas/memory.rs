//! In-memory `DocumentStore`, `FileStore` and `FunctionExecutor` used by unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::baas::models::{DocumentList, Execution, ExecutionStatus, StoredFile};
use crate::baas::{BaasError, DocumentStore, FileStore, FunctionExecutor, Query};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    failing: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
}

fn not_found(what: &str) -> BaasError {
    BaasError::Api {
        status: 404,
        kind: "document_not_found".to_string(),
        message: format!("{what} not found"),
    }
}

impl MemoryStore {
    /// Makes every call against `collection` fail with a 500.
    pub fn fail_collection(&self, collection: &str) {
        self.failing.lock().unwrap().insert(collection.to_string());
    }

    pub fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, collection: &str) -> Result<(), BaasError> {
        if self.failing.lock().unwrap().contains(collection) {
            return Err(BaasError::Api {
                status: 500,
                kind: "general_unknown".to_string(),
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, BaasError> {
        self.check(collection)?;
        let mut docs: Vec<Value> = self
            .documents(collection)
            .into_iter()
            .filter(|d| queries.iter().all(|q| q.matches(d)))
            .collect();
        let total = docs.len() as u32;
        for query in queries {
            match query {
                Query::OrderDesc { attribute } => docs.sort_by(|a, b| {
                    b[attribute]
                        .as_str()
                        .unwrap_or_default()
                        .cmp(a[attribute].as_str().unwrap_or_default())
                }),
                Query::OrderAsc { attribute } => docs.sort_by(|a, b| {
                    a[attribute]
                        .as_str()
                        .unwrap_or_default()
                        .cmp(b[attribute].as_str().unwrap_or_default())
                }),
                Query::Limit { values } => {
                    docs.truncate(values.first().copied().unwrap_or(u32::MAX) as usize)
                }
                Query::Equal { .. } => {}
            }
        }
        Ok(DocumentList {
            total,
            documents: docs,
        })
    }

    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Value, BaasError> {
        self.check(collection)?;
        self.documents(collection)
            .into_iter()
            .find(|d| d["$id"] == document_id)
            .ok_or_else(|| not_found(document_id))
    }

    async fn create_document(
        &self,
        collection: &str,
        data: Value,
        permissions: &[String],
    ) -> Result<Value, BaasError> {
        self.check(collection)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut doc = data;
        doc["$id"] = json!(format!("doc{n}"));
        doc["$createdAt"] = json!(format!("2024-01-01T00:00:00.{n:03}+00:00"));
        doc["$permissions"] = json!(permissions);
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value, BaasError> {
        self.check(collection)?;
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d["$id"] == document_id))
            .ok_or_else(|| not_found(document_id))?;
        if let (Some(target), Some(patch)) = (doc.as_object_mut(), data.as_object()) {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(doc.clone())
    }

    async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<(), BaasError> {
        self.check(collection)?;
        let mut collections = self.collections.lock().unwrap();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(document_id))?;
        let before = docs.len();
        docs.retain(|d| d["$id"] != document_id);
        if docs.len() == before {
            return Err(not_found(document_id));
        }
        Ok(())
    }
}

/// Scripted function executor: `get_execution` returns the queued statuses in
/// order, repeating the last one once the script runs out.
pub struct ScriptedExecutor {
    statuses: Mutex<VecDeque<ExecutionStatus>>,
    last: Mutex<ExecutionStatus>,
    pub created_bodies: Mutex<Vec<String>>,
    pub polls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(statuses: &[ExecutionStatus]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            last: Mutex::new(ExecutionStatus::Waiting),
            created_bodies: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.created_bodies.lock().unwrap().len() + self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FunctionExecutor for ScriptedExecutor {
    async fn create_execution(
        &self,
        _function_id: &str,
        body: &str,
        _run_async: bool,
    ) -> Result<Execution, BaasError> {
        self.created_bodies.lock().unwrap().push(body.to_string());
        Ok(Execution {
            id: "exec1".to_string(),
            status: ExecutionStatus::Waiting,
            response_status_code: 0,
            response_body: String::new(),
        })
    }

    async fn get_execution(
        &self,
        _function_id: &str,
        execution_id: &str,
    ) -> Result<Execution, BaasError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let status = match self.statuses.lock().unwrap().pop_front() {
            Some(s) => {
                *self.last.lock().unwrap() = s;
                s
            }
            None => *self.last.lock().unwrap(),
        };
        Ok(Execution {
            id: execution_id.to_string(),
            status,
            response_status_code: 200,
            response_body: String::new(),
        })
    }
}

/// Bucket kept in memory; view URLs use a fixed fake host.
#[derive(Default)]
pub struct MemoryFiles {
    files: Mutex<HashMap<String, (String, Bytes)>>,
    next_id: AtomicUsize,
    pub fail_deletes: std::sync::atomic::AtomicBool,
}

impl MemoryFiles {
    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .values()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl FileStore for MemoryFiles {
    async fn create_file(
        &self,
        file_name: &str,
        mime_type: &str,
        contents: Bytes,
    ) -> Result<StoredFile, BaasError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("file{n}");
        let size = contents.len() as u64;
        self.files
            .lock()
            .unwrap()
            .insert(id.clone(), (file_name.to_string(), contents));
        Ok(StoredFile {
            id,
            bucket_id: "files".to_string(),
            name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            size,
        })
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!("https://baas.test/v1/storage/buckets/files/files/{file_id}/view?project=test")
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), BaasError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BaasError::Api {
                status: 500,
                kind: "storage_unavailable".to_string(),
                message: "storage unavailable".to_string(),
            });
        }
        self.files
            .lock()
            .unwrap()
            .remove(file_id)
            .map(|_| ())
            .ok_or_else(|| not_found(file_id))
    }
}
