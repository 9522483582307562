//! Authentication error types.

use strata_core::error::StrataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked")]
    AccountLocked,

    #[error("account is inactive")]
    AccountInactive,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for StrataError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::AccountLocked | AuthError::AccountInactive => {
                StrataError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::TokenExpired => StrataError::TokenExpired,
            AuthError::TokenInvalid(msg) => StrataError::TokenInvalid(msg),
            AuthError::Crypto(msg) => StrataError::Crypto(msg),
        }
    }
}
