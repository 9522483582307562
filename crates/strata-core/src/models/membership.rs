//! User-to-tenant membership.
//!
//! Token issuance requires an active membership; the membership's
//! role and permission overlay are folded into the access token
//! claims alongside the user's global roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    /// Tenant-level role name (e.g., `Owner`, `User`).
    pub role: String,
    /// Permission overlay granted by this specific membership.
    pub permissions: Vec<String>,
    /// Tenant preselected when the user signs in without choosing one.
    pub is_default: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
    pub permissions: Vec<String>,
    pub is_default: bool,
}
