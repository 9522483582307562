//! Generic tenant-owned record.
//!
//! Business entities are persisted as documents in named collections.
//! The repository layer stamps `tenant_id` and the audit fields on
//! every write and filters every read by the caller's tenant scope —
//! a document is never visible outside the tenant that owns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Logical collection name (e.g., `products`, `orders`).
    pub collection: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

/// Input for inserting a document. Any `tenant_id` the caller may
/// have embedded in `data` is irrelevant — the repository stamps the
/// owning tenant from the request scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub collection: String,
    pub data: serde_json::Value,
}
