//! Resource endpoints.

use std::path::Path;

use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::models::{NewResource, Resource, ResourceList};

#[derive(Debug, Deserialize)]
struct CreatedResources {
    #[serde(default)]
    data: Vec<Resource>,
}

impl ApiClient {
    /// Every resource visible to the user, across projects.
    pub async fn list_resources(&self) -> Result<Vec<Resource>, ApiError> {
        let list: ResourceList = self
            .send_json(self.request(Method::GET, "/resources/"))
            .await?;
        Ok(list.into_vec())
    }

    pub async fn list_project_resources(&self, project_id: &str) -> Result<Vec<Resource>, ApiError> {
        let path = format!("/resources/project/{}", urlencoding::encode(project_id));
        let list: ResourceList = self.send_json(self.authed(Method::GET, &path)?).await?;
        Ok(list.into_vec())
    }

    /// Register a link-style resource; returns the created rows.
    pub async fn create_resource(&self, resource: &NewResource) -> Result<Vec<Resource>, ApiError> {
        let req = self.request(Method::POST, "/resources/").json(resource);
        let resp: CreatedResources = self.send_json(req).await?;
        Ok(resp.data)
    }

    /// Upload a file into a project as multipart `file` + `project_id`.
    pub async fn upload_resource(
        &self,
        project_id: &str,
        path: &Path,
    ) -> Result<Vec<Resource>, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().to_string());

        tracing::info!(%project_id, %file_name, size = bytes.len(), "uploading resource");
        let form = Form::new()
            .text("project_id", project_id.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let req = self
            .authed(Method::POST, "/resources/upload")?
            .multipart(form);
        let resp: CreatedResources = self.send_json(req).await?;
        Ok(resp.data)
    }
}
