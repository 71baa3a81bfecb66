//! Wire types returned by the BaaS REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub prefs: UserPrefs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPrefs {
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn is_teacher(&self) -> bool {
        self.prefs.role.as_deref() == Some("teacher")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Only populated when the session is created with a server key.
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub expire: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamPrefs {
    #[serde(rename = "joinCode", default, skip_serializing_if = "Option::is_none")]
    pub join_code: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub prefs: TeamPrefs,
}

#[derive(Debug, Deserialize)]
pub struct TeamList {
    pub total: u32,
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName", default)]
    pub user_name: String,
    #[serde(rename = "userEmail", default)]
    pub user_email: String,
    #[serde(rename = "teamId")]
    pub team_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Membership {
    pub fn is_owner(&self) -> bool {
        self.roles.iter().any(|r| r == "owner")
    }
}

#[derive(Debug, Deserialize)]
pub struct MembershipList {
    pub total: u32,
    pub memberships: Vec<Membership>,
}

/// Raw document list; documents are decoded per collection by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    pub total: u32,
    pub documents: Vec<Value>,
}

/// A stored document: system attributes plus the collection's own fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: String,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId")]
    pub bucket_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal", default)]
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Waiting,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    #[serde(rename = "$id")]
    pub id: String,
    pub status: ExecutionStatus,
    #[serde(rename = "responseStatusCode", default)]
    pub response_status_code: u16,
    #[serde(rename = "responseBody", default)]
    pub response_body: String,
}
