//! Knowledge graph endpoint.

use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::GraphData;

impl ApiClient {
    pub async fn project_graph(&self, project_id: &str) -> Result<GraphData, ApiError> {
        let path = format!("/graph?project_id={}", urlencoding::encode(project_id));
        self.send_json(self.request(Method::GET, &path)).await
    }
}
