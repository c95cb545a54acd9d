//! Authentication error types.

use nestsite_core::error::NestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("account has not accepted its invite")]
    AccountInvited,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for NestError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountDisabled
            | AuthError::AccountInvited
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => NestError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Forbidden(reason) => NestError::AuthorizationDenied { reason },
            AuthError::WeakPassword { .. } => NestError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => NestError::Crypto(msg),
        }
    }
}
