//! Session model representing an authenticated user.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// The authenticated identity and token held for the current profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token issued by the backend.
    pub token: String,
    /// Backend user id.
    pub user_id: String,
    /// Email the user logged in with.
    pub email: String,
    /// Full name shown in listings.
    pub display_name: String,
}

impl Session {
    /// Create a session from a token and the profile fetched with it.
    pub fn new(token: String, profile: UserProfile) -> Self {
        Self {
            token,
            user_id: profile.id,
            email: profile.email,
            display_name: profile.full_name,
        }
    }

    /// The user profile part of the session.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id.clone(),
            email: self.email.clone(),
            full_name: self.display_name.clone(),
        }
    }
}

/// User identity as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
}

/// Email/password pair sent to `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
