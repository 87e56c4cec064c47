//! Project endpoints.

use reqwest::Method;
use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::models::{NewProject, ProjectRef};

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Vec<ProjectRef>,
}

#[derive(Debug, Deserialize)]
struct CreatedProjects {
    #[serde(default)]
    data: Vec<ProjectRef>,
}

impl ApiClient {
    pub async fn list_projects(&self) -> Result<Vec<ProjectRef>, ApiError> {
        let resp: ProjectsResponse = self
            .send_json(self.request(Method::GET, "/projects/"))
            .await?;
        Ok(resp.projects)
    }

    /// Create a project; returns the rows the backend inserted.
    pub async fn create_project(&self, project: &NewProject) -> Result<Vec<ProjectRef>, ApiError> {
        let req = self.request(Method::POST, "/projects/").json(project);
        let resp: CreatedProjects = self.send_json(req).await?;
        Ok(resp.data)
    }

    /// Append text to the project's linked Google Doc.
    pub async fn push_to_docs(&self, text: &str) -> Result<serde_json::Value, ApiError> {
        let req = self
            .request(Method::POST, "/projects/push-to-docs")
            .json(&serde_json::json!({ "text": text }));
        self.send_json(req).await
    }
}
