//! Explicit authentication handles.
//!
//! Every gateway call receives the caller's [`Session`]; there is no ambient
//! "current user".

use crate::error::{RuneError, RuneResult};
use crate::types::UserId;

/// An authenticated user and the bearer token for remote gateways
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            access_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Whether anyone is signed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl AuthState {
    /// Build from an optional user id (blank ids count as anonymous)
    pub fn from_user(user: Option<&str>, token: Option<String>) -> Self {
        match user.map(str::trim).filter(|u| !u.is_empty()) {
            Some(user) => {
                let mut session = Session::new(UserId::new(user));
                session.access_token = token;
                AuthState::Authenticated(session)
            }
            None => AuthState::Anonymous,
        }
    }

    /// The session, or `AuthenticationRequired`
    pub fn require(&self) -> RuneResult<&Session> {
        match self {
            AuthState::Authenticated(session) => Ok(session),
            AuthState::Anonymous => Err(RuneError::AuthenticationRequired),
        }
    }
}
