//! Workflow (agent) endpoints.

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{NewWorkflow, Workflow};

impl ApiClient {
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError> {
        self.send_json(self.authed(Method::GET, "/agents/workflows/list")?)
            .await
    }

    pub async fn create_workflow(
        &self,
        workflow: &NewWorkflow,
    ) -> Result<serde_json::Value, ApiError> {
        let req = self
            .authed(Method::POST, "/agents/create-workflow")?
            .json(workflow);
        self.send_json(req).await
    }

    /// Run a stored workflow. `run_key` is [`Workflow::run_key`].
    pub async fn run_workflow(&self, run_key: &str) -> Result<serde_json::Value, ApiError> {
        let path = format!(
            "/agents/workflows/run?workflow_id={}",
            urlencoding::encode(run_key)
        );
        self.send_json(self.authed(Method::GET, &path)?).await
    }
}
