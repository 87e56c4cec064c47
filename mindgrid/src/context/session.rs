//! Session context: the single source of truth for "is someone logged in,
//! and as whom".

use thiserror::Error;

use crate::api::{ApiError, AuthApi};
use crate::models::{Credentials, Session, UserProfile};
use crate::store::{StateStore, StoreError};

const TOKEN_KEY: &str = "token";
const EMAIL_KEY: &str = "email";
const FULL_NAME_KEY: &str = "full_name";
const ID_KEY: &str = "id";
const USER_KEY: &str = "user";

const SESSION_KEYS: &[&str] = &[TOKEN_KEY, EMAIL_KEY, FULL_NAME_KEY, ID_KEY, USER_KEY];

#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend rejected the login or the profile fetch.
    #[error("authentication failed: {0}")]
    Auth(#[source] ApiError),

    #[error("not logged in; run `mindgrid login` first")]
    NotLoggedIn,

    #[error("cannot persist session: {0}")]
    Store(#[from] StoreError),
}

/// In-memory session holder mirrored into a [`StateStore`].
#[derive(Debug)]
pub struct SessionContext<S> {
    store: S,
    current: Option<Session>,
}

impl<S: StateStore> SessionContext<S> {
    /// Context with no session, regardless of what the store holds.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Context initialized from the store.
    pub fn restore(store: S) -> Self {
        let mut ctx = Self::new(store);
        ctx.restore_from_storage();
        ctx
    }

    /// Reload the session from the store.
    ///
    /// Any missing or empty required field (`token`, `email`, `id`) yields no
    /// session at all. So does a store that cannot be read; the next login or
    /// logout overwrites it.
    pub fn restore_from_storage(&mut self) -> Option<&Session> {
        self.current = self.read_stored().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read saved session");
            None
        });
        tracing::debug!(authenticated = self.current.is_some(), "session restored");
        self.current.as_ref()
    }

    fn read_stored(&self) -> Result<Option<Session>, StoreError> {
        let read = |key: &str| -> Result<Option<String>, StoreError> {
            Ok(self.store.get(key)?.filter(|v| !v.is_empty()))
        };

        let token = read(TOKEN_KEY)?;
        let email = read(EMAIL_KEY)?;
        let id = read(ID_KEY)?;
        let full_name = read(FULL_NAME_KEY)?.unwrap_or_default();

        Ok(match (token, email, id) {
            (Some(token), Some(email), Some(id)) => Some(Session {
                token,
                user_id: id,
                email,
                display_name: full_name,
            }),
            _ => None,
        })
    }

    pub const fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// The session, or [`SessionError::NotLoggedIn`].
    pub fn require(&self) -> Result<&Session, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotLoggedIn)
    }

    /// Log in with email and password.
    ///
    /// On any failure the previous session (or its absence) is kept.
    pub async fn login<A>(&mut self, api: &A, credentials: &Credentials) -> Result<&Session, SessionError>
    where
        A: AuthApi + ?Sized,
    {
        let token = api.login(credentials).await.map_err(SessionError::Auth)?;
        self.finish_login(api, token).await
    }

    /// Log in by exchanging a Google authorization code.
    pub async fn login_with_google<A>(&mut self, api: &A, code: &str) -> Result<&Session, SessionError>
    where
        A: AuthApi + ?Sized,
    {
        let token = api.login_with_google(code).await.map_err(SessionError::Auth)?;
        self.finish_login(api, token).await
    }

    async fn finish_login<A>(&mut self, api: &A, token: String) -> Result<&Session, SessionError>
    where
        A: AuthApi + ?Sized,
    {
        let profile = api.me(&token).await.map_err(SessionError::Auth)?;
        let session = Session::new(token, profile);

        self.persist(&session)?;
        tracing::info!(user_id = %session.user_id, "logged in");
        Ok(self.current.insert(session))
    }

    fn persist(&self, session: &Session) -> Result<(), StoreError> {
        let user = serde_json::to_string(&session.profile())?;
        self.store.set_many(&[
            (TOKEN_KEY, session.token.clone()),
            (EMAIL_KEY, session.email.clone()),
            (FULL_NAME_KEY, session.display_name.clone()),
            (ID_KEY, session.user_id.clone()),
            (USER_KEY, user),
        ])
    }

    /// Forget the session. Always succeeds locally; a store failure is logged.
    pub fn logout(&mut self) {
        self.current = None;
        if let Err(e) = self.store.remove_many(SESSION_KEYS) {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
        tracing::info!("logged out");
    }

    /// Profile mirrored under the `user` key, if any.
    pub fn stored_user(&self) -> Option<UserProfile> {
        let raw = self.store.get(USER_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }
}
