//! Authentication session held by the client.
//!
//! Only the bearer token and the signed-in user are kept; the login
//! flow itself (Firebase, OTP) happens elsewhere and hands the result to
//! [`Session::login`].

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// The signed-in user, as returned by the backend login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<SessionUser>,
}

/// In-memory session store shared by every screen.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that starts signed in with `token` (no user profile).
    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(Some(token.into()));
        session
    }

    pub fn login(&self, token: impl Into<String>, user: SessionUser) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = normalize_token(Some(token.into()));
        state.user = Some(user);
        tracing::info!(authenticated = state.token.is_some(), "Session login");
    }

    pub fn logout(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = None;
        state.user = None;
        tracing::info!("Session logout");
    }

    pub fn set_token(&self, token: Option<String>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = normalize_token(token);
    }

    /// Current bearer token, if the user is signed in.
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Tokens restored from storage sometimes come back as the literal
/// strings `"null"` / `"undefined"`; those mean signed out.
fn normalize_token(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != "null" && t != "undefined")
}
