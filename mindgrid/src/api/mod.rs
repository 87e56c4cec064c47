//! API access functions for the MindGrid backend.
//!
//! Each function issues exactly one HTTP request and decodes exactly one
//! JSON response. Nothing is retried or cached here.
//!
//! Endpoints:
//! - POST /auth/login, /auth/signup, /auth/oauth/google; GET /auth/me
//! - GET|POST /projects/; POST /projects/push-to-docs
//! - GET /resources/, /resources/project/{id}; POST /resources/, /resources/upload
//! - GET /graph?project_id=
//! - GET /google-services/docs; POST /google-services/import-docs
//! - GET /agents/workflows/list, /agents/workflows/run; POST /agents/create-workflow
//! - POST /chat/llm

mod agents;
mod auth;
mod chat;
mod client;
mod error;
mod google;
mod graph;
mod projects;
mod resources;
#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthApi;
pub use client::ApiClient;
pub use error::ApiError;
