//! Tenant domain model.
//!
//! A tenant is an isolated customer organization — the unit of data
//! partitioning and plan billing. Every tenant-owned entity carries
//! the tenant id and is invisible outside its tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing plan assigned to a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
    Free,
    Standard,
    Premium,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "Free",
            PlanType::Standard => "Standard",
            PlanType::Premium => "Premium",
        }
    }
}

/// Lifecycle status of a tenant.
///
/// Only `Active` tenants accept requests. `Suspended` and `Disabled`
/// are rejected distinctly from not-found so clients know not to
/// retry with a different identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantStatus {
    Active,
    Suspended,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// URL-safe unique identifier (e.g., `acme-corp`).
    pub slug: String,
    /// Unique host label for subdomain resolution, if assigned.
    pub subdomain: Option<String>,
    /// Schema / partition key for per-tenant platform tables.
    pub schema: String,
    pub plan: PlanType,
    pub status: TenantStatus,
    /// Daily API request quota; supplied by the billing collaborator
    /// at create/assign-plan time.
    pub api_request_limit_per_day: i64,
    pub storage_limit_mb: i64,
    /// Arbitrary tenant settings blob.
    pub settings: serde_json::Value,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub slug: String,
    pub subdomain: Option<String>,
    pub schema: String,
    pub plan: PlanType,
    pub api_request_limit_per_day: i64,
    pub storage_limit_mb: i64,
    pub settings: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub subdomain: Option<Option<String>>,
    pub plan: Option<PlanType>,
    pub status: Option<TenantStatus>,
    pub api_request_limit_per_day: Option<i64>,
    pub storage_limit_mb: Option<i64>,
    pub settings: Option<serde_json::Value>,
}
