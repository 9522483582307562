//! STRATA Client — session token storage and single-flight refresh
//! coordination for API consumers.

pub mod coordinator;
pub mod error;
pub mod session;

pub use coordinator::{RefreshCoordinator, TokenRotator};
pub use error::ClientError;
pub use session::{SessionStore, SessionTokens};
