//! STRATA Auth — Password authentication, JWT issuance/validation,
//! and refresh token lifecycle.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{LoginInput, LoginOutput, SessionIssuer, TokenPair};
pub use token::{AccessTokenClaims, SigningKeys};
