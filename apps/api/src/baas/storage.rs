use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::info;

use crate::baas::models::StoredFile;
use crate::baas::{BaasClient, BaasError, UNIQUE_ID};

/// Files in the configured bucket.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn create_file(
        &self,
        file_name: &str,
        mime_type: &str,
        contents: Bytes,
    ) -> Result<StoredFile, BaasError>;

    /// Public view URL for a stored file.
    fn file_view_url(&self, file_id: &str) -> String;

    async fn delete_file(&self, file_id: &str) -> Result<(), BaasError>;
}

#[async_trait]
impl FileStore for BaasClient {
    async fn create_file(
        &self,
        file_name: &str,
        mime_type: &str,
        contents: Bytes,
    ) -> Result<StoredFile, BaasError> {
        let part = Part::bytes(contents.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().text("fileId", UNIQUE_ID).part("file", part);
        let path = format!("/storage/buckets/{}/files", self.bucket_id());
        let file: StoredFile = self
            .send_json(self.request(Method::POST, &path).multipart(form))
            .await?;
        info!("Uploaded {} ({} bytes) as file {}", file_name, file.size, file.id);
        Ok(file)
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint(),
            self.bucket_id(),
            file_id,
            self.project_id()
        )
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), BaasError> {
        let path = format!("/storage/buckets/{}/files/{}", self.bucket_id(), file_id);
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}

/// Recovers the file id from a view URL of the form
/// `.../storage/buckets/{bucket}/files/{file}/view[?project=...]`.
pub fn file_id_from_view_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let last = segments.next()?;
    if last != "view" {
        return None;
    }
    segments.next().filter(|id| !id.is_empty() && *id != "files")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_url_round_trips_to_file_id() {
        let client = BaasClient::new("https://baas.example/v1", "proj", None, "db", "files");
        let url = client.file_view_url("abc123");
        assert_eq!(
            url,
            "https://baas.example/v1/storage/buckets/files/files/abc123/view?project=proj"
        );
        assert_eq!(file_id_from_view_url(&url), Some("abc123"));
    }

    #[test]
    fn test_file_id_without_query_string() {
        let url = "https://cloud.example/v1/storage/buckets/files/files/f9/view";
        assert_eq!(file_id_from_view_url(url), Some("f9"));
    }

    #[test]
    fn test_non_view_url_has_no_file_id() {
        assert_eq!(file_id_from_view_url("https://cdn.example/images/pic.png"), None);
        assert_eq!(file_id_from_view_url("view"), None);
        assert_eq!(file_id_from_view_url(""), None);
    }
}
