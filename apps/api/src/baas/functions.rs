use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use crate::baas::models::Execution;
use crate::baas::{BaasClient, BaasError};

/// Serverless function executions. Carried as a trait so the join-code poll
/// can run against a scripted executor in tests.
#[async_trait]
pub trait FunctionExecutor: Send + Sync {
    async fn create_execution(
        &self,
        function_id: &str,
        body: &str,
        run_async: bool,
    ) -> Result<Execution, BaasError>;

    async fn get_execution(
        &self,
        function_id: &str,
        execution_id: &str,
    ) -> Result<Execution, BaasError>;
}

#[async_trait]
impl FunctionExecutor for BaasClient {
    async fn create_execution(
        &self,
        function_id: &str,
        body: &str,
        run_async: bool,
    ) -> Result<Execution, BaasError> {
        let path = format!("/functions/{function_id}/executions");
        let req = self
            .request(Method::POST, &path)
            .json(&json!({ "body": body, "async": run_async }));
        self.send_json(req).await
    }

    async fn get_execution(
        &self,
        function_id: &str,
        execution_id: &str,
    ) -> Result<Execution, BaasError> {
        let path = format!("/functions/{function_id}/executions/{execution_id}");
        self.send_json(self.request(Method::GET, &path)).await
    }
}
