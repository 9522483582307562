//! Error types for the STRATA system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrataError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Tenant could not be resolved from the request")]
    TenantNotResolvable,

    #[error("Tenant not found: {candidate}")]
    TenantNotFound { candidate: String },

    #[error("Tenant is not active: {tenant_id}")]
    TenantNotActive { tenant_id: String },

    #[error("Plan request limit reached for tenant {tenant_id}")]
    QuotaExceeded { tenant_id: String },

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Refresh token reuse detected for user {user_id}")]
    RefreshReused { user_id: String },

    #[error("User {user_id} is not a member of tenant {tenant_id}")]
    NotMember { user_id: String, tenant_id: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StrataError {
    /// HTTP status equivalent for the shape-level request contract.
    ///
    /// Resolution failures map to 400, inactive tenants and missing
    /// memberships to 403, quota exhaustion to 429, and every token
    /// failure class to 401.
    pub fn http_status(&self) -> u16 {
        match self {
            StrataError::TenantNotResolvable | StrataError::TenantNotFound { .. } => 400,
            StrataError::TenantNotActive { .. } | StrataError::NotMember { .. } => 403,
            StrataError::QuotaExceeded { .. } => 429,
            StrataError::TokenExpired
            | StrataError::TokenInvalid(_)
            | StrataError::RefreshReused { .. }
            | StrataError::AuthenticationFailed { .. } => 401,
            StrataError::NotFound { .. } => 404,
            StrataError::AlreadyExists { .. } => 409,
            StrataError::Validation { .. } => 422,
            StrataError::TenantContext
            | StrataError::Database(_)
            | StrataError::Crypto(_)
            | StrataError::Internal(_) => 500,
        }
    }

    /// True only for the single error class a client may recover from
    /// automatically with one refresh round-trip.
    pub fn is_retriable_via_refresh(&self) -> bool {
        matches!(self, StrataError::TokenExpired)
    }
}

pub type StrataResult<T> = Result<T, StrataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_request_contract() {
        assert_eq!(StrataError::TenantNotResolvable.http_status(), 400);
        assert_eq!(
            StrataError::TenantNotFound {
                candidate: "acme".into()
            }
            .http_status(),
            400
        );
        assert_eq!(
            StrataError::TenantNotActive {
                tenant_id: "t".into()
            }
            .http_status(),
            403
        );
        assert_eq!(
            StrataError::QuotaExceeded {
                tenant_id: "t".into()
            }
            .http_status(),
            429
        );
        assert_eq!(StrataError::TokenExpired.http_status(), 401);
        assert_eq!(StrataError::TokenInvalid("x".into()).http_status(), 401);
    }

    #[test]
    fn only_expiry_is_refresh_retriable() {
        assert!(StrataError::TokenExpired.is_retriable_via_refresh());
        assert!(!StrataError::TokenInvalid("x".into()).is_retriable_via_refresh());
        assert!(
            !StrataError::RefreshReused {
                user_id: "u".into()
            }
            .is_retriable_via_refresh()
        );
    }
}
