//! SurrealDB repository implementations.

mod document;
mod membership;
mod refresh_token;
mod role;
mod tenant;
mod usage;
mod user;

pub use document::SurrealDocumentRepository;
pub use membership::SurrealMembershipRepository;
pub use refresh_token::SurrealRefreshTokenRepository;
pub use role::SurrealRoleRepository;
pub use tenant::SurrealTenantRepository;
pub use usage::SurrealUsageRepository;
pub use user::SurrealUserRepository;

use strata_core::models::refresh_token::RefreshTokenStatus;
use strata_core::models::tenant::{PlanType, TenantStatus};
use strata_core::models::user::UserStatus;
use uuid::Uuid;

use crate::error::DbError;

// Enum <-> string conversions shared across repositories. Stored
// values must match the ASSERT lists in the schema.

pub(crate) fn parse_uuid(entity: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Query(format!("invalid {entity} UUID: {e}")))
}

pub(crate) fn plan_to_str(plan: PlanType) -> &'static str {
    plan.as_str()
}

pub(crate) fn plan_from_str(raw: &str) -> Result<PlanType, DbError> {
    match raw {
        "Free" => Ok(PlanType::Free),
        "Standard" => Ok(PlanType::Standard),
        "Premium" => Ok(PlanType::Premium),
        other => Err(DbError::Query(format!("unknown plan: {other}"))),
    }
}

pub(crate) fn tenant_status_to_str(status: TenantStatus) -> &'static str {
    match status {
        TenantStatus::Active => "Active",
        TenantStatus::Suspended => "Suspended",
        TenantStatus::Disabled => "Disabled",
    }
}

pub(crate) fn tenant_status_from_str(raw: &str) -> Result<TenantStatus, DbError> {
    match raw {
        "Active" => Ok(TenantStatus::Active),
        "Suspended" => Ok(TenantStatus::Suspended),
        "Disabled" => Ok(TenantStatus::Disabled),
        other => Err(DbError::Query(format!("unknown tenant status: {other}"))),
    }
}

pub(crate) fn user_status_to_str(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "Active",
        UserStatus::Inactive => "Inactive",
        UserStatus::Locked => "Locked",
    }
}

pub(crate) fn user_status_from_str(raw: &str) -> Result<UserStatus, DbError> {
    match raw {
        "Active" => Ok(UserStatus::Active),
        "Inactive" => Ok(UserStatus::Inactive),
        "Locked" => Ok(UserStatus::Locked),
        other => Err(DbError::Query(format!("unknown user status: {other}"))),
    }
}

pub(crate) fn token_status_from_str(raw: &str) -> Result<RefreshTokenStatus, DbError> {
    match raw {
        "Active" => Ok(RefreshTokenStatus::Active),
        "Used" => Ok(RefreshTokenStatus::Used),
        "Revoked" => Ok(RefreshTokenStatus::Revoked),
        other => Err(DbError::Query(format!("unknown token status: {other}"))),
    }
}
