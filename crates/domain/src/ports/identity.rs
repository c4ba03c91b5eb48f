use thiserror::Error;

use super::BoxFuture;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity unauthorized: {0}")]
    Unauthorized(String),
    #[error("identity forbidden: {0}")]
    Forbidden(String),
    #[error("identity upstream error: {0}")]
    Upstream(String),
    #[error("identity transport error: {0}")]
    Transport(String),
    #[error("identity response decode error: {0}")]
    InvalidResponse(String),
}

/// A token holder as reported by the identity provider. `acct` is always
/// fully qualified (`user@domain`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub acct: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

pub trait IdentityPort: Send + Sync {
    fn verify_token(&self, token: &str)
    -> BoxFuture<'_, Result<VerifiedIdentity, IdentityError>>;
}
