//! crates/reading_list_core/src/error.rs
//!
//! Errors raised by the resolver logic.

use crate::ports::PortError;

pub const COULD_NOT_AUTHENTICATE: &str = "Could not authenticate user.";
pub const LOGIN_REQUIRED: &str = "You need to be logged in!";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Missing identity or bad credentials. The message never says which
    /// credential was wrong.
    #[error("{0}")]
    Authentication(String),

    /// Store and auth collaborator errors, passed through as they are.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl CoreError {
    pub fn could_not_authenticate() -> Self {
        Self::Authentication(COULD_NOT_AUTHENTICATE.to_string())
    }

    pub fn login_required() -> Self {
        Self::Authentication(LOGIN_REQUIRED.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
