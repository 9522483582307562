//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-owned data is reached
//! only through [`DocumentRepository`], whose every operation takes an
//! explicit [`TenantScope`] — scoping to the resolved tenant is a
//! structural property, not a per-call-site convention.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::context::TenantScope;
use crate::error::StrataResult;
use crate::models::{
    document::{CreateDocument, Document},
    membership::{CreateMembership, Membership},
    refresh_token::{CreateRefreshToken, RefreshToken},
    role::{CreateRole, Role},
    tenant::{CreateTenant, PlanType, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Platform scope: tenants, users, roles, memberships
// ---------------------------------------------------------------------------

/// Authoritative tenant lookup. Soft-deleted tenants are invisible to
/// every getter; the directory layer adds the read cache on top.
pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = StrataResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<Tenant>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = StrataResult<Tenant>> + Send;
    fn get_by_subdomain(
        &self,
        subdomain: &str,
    ) -> impl Future<Output = StrataResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = StrataResult<Tenant>> + Send;
    /// Soft-delete: flips the flag; the record stays for audit.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = StrataResult<()>> + Send;
    /// All non-deleted tenants, for the background job sweep.
    fn list_active(&self) -> impl Future<Output = StrataResult<Vec<Tenant>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = StrataResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = StrataResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = StrataResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = StrataResult<User>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = StrataResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<Role>> + Send;
    fn assign_to_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = StrataResult<()>> + Send;
    /// All roles assigned to a user; feeds access-token claims.
    fn get_user_roles(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StrataResult<Vec<Role>>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = StrataResult<Membership>> + Send;
    /// The active (non-deleted) membership of a user in a tenant.
    fn get(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> impl Future<Output = StrataResult<Membership>> + Send;
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StrataResult<Vec<Membership>>> + Send;
    fn soft_delete(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> impl Future<Output = StrataResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Refresh tokens
// ---------------------------------------------------------------------------

pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new active token, atomically revoking any prior
    /// active token for the same user (at most one active per user).
    fn create(
        &self,
        input: CreateRefreshToken,
    ) -> impl Future<Output = StrataResult<RefreshToken>> + Send;

    /// Look up a token record by its hash regardless of status, so
    /// the service can distinguish "unknown" from "already used".
    fn get_by_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = StrataResult<Option<RefreshToken>>> + Send;

    /// Single-transaction rotation: mark the old token `Used` (only
    /// if it is still `Active` — a compare-and-set) and create the
    /// replacement. Fails without side effect when the CAS misses,
    /// so two concurrent rotations of one token cannot both succeed.
    fn consume_and_replace(
        &self,
        old_hash: &str,
        replacement: CreateRefreshToken,
    ) -> impl Future<Output = StrataResult<RefreshToken>> + Send;

    /// Revoke one token by hash; `false` when no active record
    /// matched.
    fn revoke_by_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = StrataResult<bool>> + Send;

    /// Revoke every active token for a user; returns the count and
    /// never errors on zero.
    fn revoke_all_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StrataResult<u64>> + Send;

    /// Remove expired token records.
    fn cleanup_expired(&self) -> impl Future<Output = StrataResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Usage counters
// ---------------------------------------------------------------------------

pub trait UsageRepository: Send + Sync {
    /// Conditionally increment the counter for (tenant, metric, day):
    /// returns `Some(new_amount)` when the pre-increment amount was
    /// below `limit`, `None` (and no write) when the quota is spent.
    /// The read-check-increment must be atomic under concurrency.
    fn try_increment(
        &self,
        tenant_id: Uuid,
        metric: &str,
        day: NaiveDate,
        limit: i64,
        plan: PlanType,
    ) -> impl Future<Output = StrataResult<Option<i64>>> + Send;

    /// Current amount for (tenant, metric, day); zero when the
    /// counter does not exist yet.
    fn amount_for_day(
        &self,
        tenant_id: Uuid,
        metric: &str,
        day: NaiveDate,
    ) -> impl Future<Output = StrataResult<i64>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-owned documents (the isolation gate)
// ---------------------------------------------------------------------------

pub trait DocumentRepository: Send + Sync {
    /// Insert with `tenant_id` stamped from the scope (caller input is
    /// overridden) plus created-by audit stamps.
    fn insert(
        &self,
        scope: &TenantScope,
        input: CreateDocument,
    ) -> impl Future<Output = StrataResult<Document>> + Send;

    /// Scoped read: only the scope's tenant, only non-deleted.
    fn get_by_id(
        &self,
        scope: &TenantScope,
        collection: &str,
        id: Uuid,
    ) -> impl Future<Output = StrataResult<Document>> + Send;

    fn list(
        &self,
        scope: &TenantScope,
        collection: &str,
        pagination: Pagination,
    ) -> impl Future<Output = StrataResult<PaginatedResult<Document>>> + Send;

    /// Scoped update with updated-by audit stamps.
    fn update(
        &self,
        scope: &TenantScope,
        collection: &str,
        id: Uuid,
        data: serde_json::Value,
    ) -> impl Future<Output = StrataResult<Document>> + Send;

    /// Deletes are soft: flag + timestamp + actor, never physical
    /// removal. Explicit by design so the contract is visible at call
    /// sites.
    fn soft_delete(
        &self,
        scope: &TenantScope,
        collection: &str,
        id: Uuid,
    ) -> impl Future<Output = StrataResult<()>> + Send;
}
