//! BaaS client: the single point of entry for every call to the
//! backend-as-a-service (accounts, teams, documents, files, functions).
//!
//! No other module may talk to the BaaS REST API directly.
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod account;
pub mod databases;
pub mod functions;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod query;
pub mod storage;
pub mod teams;

pub use databases::{Collection, DocumentStore};
pub use functions::FunctionExecutor;
pub use query::Query;
pub use storage::FileStore;

/// Lets the BaaS generate the document/team/file id.
pub const UNIQUE_ID: &str = "unique()";

const RESPONSE_FORMAT: &str = "1.5.0";

#[derive(Debug, Error)]
pub enum BaasError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("BaaS error (status {status}, {kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BaasError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BaasError::Api { status, .. } => Some(*status),
            BaasError::Http(e) => e.status().map(|s| s.as_u16()),
            BaasError::Parse(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Thin REST wrapper around the BaaS. Cheap to clone; a user-scoped copy is
/// obtained with [`BaasClient::with_session`].
#[derive(Clone)]
pub struct BaasClient {
    client: Client,
    endpoint: String,
    project_id: String,
    api_key: Option<String>,
    session: Option<String>,
    database_id: String,
    bucket_id: String,
}

impl BaasClient {
    pub fn new(
        endpoint: &str,
        project_id: &str,
        api_key: Option<String>,
        database_id: &str,
        bucket_id: &str,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key,
            session: None,
            database_id: database_id.to_string(),
            bucket_id: bucket_id.to_string(),
        }
    }

    /// Returns a copy of this client acting on behalf of the given session.
    pub fn with_session(&self, secret: &str) -> Self {
        Self {
            session: Some(secret.to_string()),
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Builds a request carrying the project, key and session headers.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT);
        if let Some(key) = &self.api_key {
            req = req.header("X-Appwrite-Key", key);
        }
        if let Some(session) = &self.session {
            req = req.header("X-Appwrite-Session", session);
        }
        req
    }

    /// Sends a request and deserializes a successful JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, BaasError> {
        let response = check_status(req.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sends a request whose successful response carries no body we need.
    pub(crate) async fn send_empty(&self, req: RequestBuilder) -> Result<(), BaasError> {
        check_status(req.send().await?).await?;
        Ok(())
    }
}

/// Turns non-success responses into `BaasError::Api`, keeping the BaaS message.
async fn check_status(response: Response) -> Result<Response, BaasError> {
    let status = response.status();
    if status.is_success() {
        debug!("BaaS {} {}", status.as_u16(), response.url().path());
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, kind) = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(e) => (e.message, e.kind),
        Err(_) => (body, String::new()),
    };
    warn!("BaaS returned {}: {}", status, message);
    Err(BaasError::Api {
        status: status.as_u16(),
        kind,
        message,
    })
}
