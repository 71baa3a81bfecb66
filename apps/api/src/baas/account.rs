use reqwest::Method;
use serde_json::json;
use tracing::info;

use crate::baas::models::{Session, User};
use crate::baas::{BaasClient, BaasError, UNIQUE_ID};

impl BaasClient {
    /// Registers a new account.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, BaasError> {
        let req = self.request(Method::POST, "/account").json(&json!({
            "userId": UNIQUE_ID,
            "email": email,
            "password": password,
            "name": name,
        }));
        let user: User = self.send_json(req).await?;
        info!("Registered account {}", user.id);
        Ok(user)
    }

    pub async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BaasError> {
        let req = self
            .request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }));
        self.send_json(req).await
    }

    /// Returns the user the current session belongs to.
    pub async fn get_account(&self) -> Result<User, BaasError> {
        self.send_json(self.request(Method::GET, "/account")).await
    }

    /// Deletes a session; `"current"` deletes the one this client carries.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), BaasError> {
        let path = format!("/account/sessions/{session_id}");
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
