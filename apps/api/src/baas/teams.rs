use reqwest::Method;
use serde_json::json;

use crate::baas::models::{MembershipList, Team, TeamList, TeamPrefs};
use crate::baas::{BaasClient, BaasError};

impl BaasClient {
    pub async fn create_team(&self, team_id: &str, name: &str) -> Result<Team, BaasError> {
        let req = self
            .request(Method::POST, "/teams")
            .json(&json!({ "teamId": team_id, "name": name }));
        self.send_json(req).await
    }

    pub async fn get_team(&self, team_id: &str) -> Result<Team, BaasError> {
        let path = format!("/teams/{team_id}");
        self.send_json(self.request(Method::GET, &path)).await
    }

    pub async fn update_team_name(&self, team_id: &str, name: &str) -> Result<Team, BaasError> {
        let path = format!("/teams/{team_id}");
        let req = self.request(Method::PUT, &path).json(&json!({ "name": name }));
        self.send_json(req).await
    }

    pub async fn delete_team(&self, team_id: &str) -> Result<(), BaasError> {
        let path = format!("/teams/{team_id}");
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    /// Lists the teams visible to the current session.
    pub async fn list_teams(&self) -> Result<TeamList, BaasError> {
        self.send_json(self.request(Method::GET, "/teams")).await
    }

    pub async fn list_memberships(&self, team_id: &str) -> Result<MembershipList, BaasError> {
        let path = format!("/teams/{team_id}/memberships");
        self.send_json(self.request(Method::GET, &path)).await
    }

    pub async fn update_team_prefs(
        &self,
        team_id: &str,
        prefs: &TeamPrefs,
    ) -> Result<TeamPrefs, BaasError> {
        let path = format!("/teams/{team_id}/prefs");
        let req = self
            .request(Method::PUT, &path)
            .json(&json!({ "prefs": prefs }));
        self.send_json(req).await
    }
}
