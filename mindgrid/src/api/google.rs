//! Google Docs integration endpoints.

use reqwest::Method;
use serde::Serialize;

use super::{ApiClient, ApiError};
use crate::models::{DocsResponse, GoogleDoc};

#[derive(Serialize)]
struct ImportRequest<'a> {
    docs: &'a [GoogleDoc],
}

impl ApiClient {
    /// Google Docs in the user's linked Drive.
    pub async fn list_google_docs(&self) -> Result<Vec<GoogleDoc>, ApiError> {
        let resp: DocsResponse = self
            .send_json(self.authed(Method::GET, "/google-services/docs")?)
            .await?;
        Ok(resp.into_docs())
    }

    /// Import the given docs into a project as resources.
    pub async fn import_google_docs(
        &self,
        project_id: &str,
        docs: &[GoogleDoc],
    ) -> Result<serde_json::Value, ApiError> {
        let path = format!(
            "/google-services/import-docs?project_id={}",
            urlencoding::encode(project_id)
        );
        let req = self.authed(Method::POST, &path)?.json(&ImportRequest { docs });
        self.send_json(req).await
    }
}
