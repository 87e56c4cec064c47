//! Document chat endpoint.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};

/// Shown when the backend answers without a completion.
pub const EMPTY_REPLY: &str = "No response from AI.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    llm_response: Option<String>,
}

impl ApiClient {
    /// Ask the LLM a question over the project's documents.
    pub async fn ask(&self, query: &str) -> Result<String, ApiError> {
        let req = self
            .request(Method::POST, "/chat/llm")
            .json(&ChatRequest { query });
        let resp: ChatResponse = self.send_json(req).await?;
        Ok(resp
            .llm_response
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}
