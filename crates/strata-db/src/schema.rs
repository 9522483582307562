//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Platform tables
//! (tenant/user/role) are global; tenant-owned tables carry a
//! `tenant_id` column and rely on the repository layer for row-level
//! scoping.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD subdomain ON TABLE tenant TYPE option<string>;
DEFINE FIELD schema ON TABLE tenant TYPE string;
DEFINE FIELD plan ON TABLE tenant TYPE string \
    ASSERT $value IN ['Free', 'Standard', 'Premium'];
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['Active', 'Suspended', 'Disabled'];
DEFINE FIELD api_request_limit_per_day ON TABLE tenant TYPE int;
DEFINE FIELD storage_limit_mb ON TABLE tenant TYPE int;
DEFINE FIELD settings ON TABLE tenant TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD is_deleted ON TABLE tenant TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;
DEFINE INDEX idx_tenant_subdomain ON TABLE tenant COLUMNS subdomain;

-- =======================================================================
-- Users (platform scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Active', 'Inactive', 'Locked'];
DEFINE FIELD is_deleted ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Roles (platform scope) and user assignments
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD permissions ON TABLE role TYPE array;
DEFINE FIELD permissions.* ON TABLE role TYPE string;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

DEFINE TABLE user_role SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_role TYPE string;
DEFINE FIELD role_id ON TABLE user_role TYPE string;
DEFINE FIELD created_at ON TABLE user_role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_role ON TABLE user_role \
    COLUMNS user_id, role_id UNIQUE;

-- =======================================================================
-- User-to-tenant memberships
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD tenant_id ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string;
DEFINE FIELD permissions ON TABLE membership TYPE array;
DEFINE FIELD permissions.* ON TABLE membership TYPE string;
DEFINE FIELD is_default ON TABLE membership TYPE bool DEFAULT false;
DEFINE FIELD is_deleted ON TABLE membership TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_user_tenant ON TABLE membership \
    COLUMNS user_id, tenant_id UNIQUE;

-- =======================================================================
-- Refresh tokens (single-use, hashed at rest)
-- =======================================================================
DEFINE TABLE refresh_token SCHEMAFULL;
DEFINE FIELD user_id ON TABLE refresh_token TYPE string;
DEFINE FIELD token_hash ON TABLE refresh_token TYPE string;
DEFINE FIELD status ON TABLE refresh_token TYPE string \
    ASSERT $value IN ['Active', 'Used', 'Revoked'];
DEFINE FIELD expires_at ON TABLE refresh_token TYPE datetime;
DEFINE FIELD used_at ON TABLE refresh_token TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE refresh_token TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_refresh_token_hash ON TABLE refresh_token \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_refresh_token_user ON TABLE refresh_token \
    COLUMNS user_id, status;

-- =======================================================================
-- Usage counters (one record per tenant, metric, and UTC day)
-- =======================================================================
DEFINE TABLE usage_counter SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE usage_counter TYPE string;
DEFINE FIELD metric ON TABLE usage_counter TYPE string;
DEFINE FIELD day ON TABLE usage_counter TYPE string;
DEFINE FIELD amount ON TABLE usage_counter TYPE int DEFAULT 0;
DEFINE FIELD plan_at_capture ON TABLE usage_counter TYPE string \
    ASSERT $value IN ['Free', 'Standard', 'Premium'];
DEFINE FIELD updated_at ON TABLE usage_counter TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_usage_tenant_metric_day ON TABLE usage_counter \
    COLUMNS tenant_id, metric, day UNIQUE;

-- =======================================================================
-- Documents (tenant-owned records, soft-deleted, audit-stamped)
-- =======================================================================
DEFINE TABLE document SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE document TYPE string;
DEFINE FIELD collection ON TABLE document TYPE string;
DEFINE FIELD data ON TABLE document TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE document TYPE string;
DEFINE FIELD updated_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_by ON TABLE document TYPE string;
DEFINE FIELD is_deleted ON TABLE document TYPE bool DEFAULT false;
DEFINE FIELD deleted_at ON TABLE document TYPE option<datetime>;
DEFINE FIELD deleted_by ON TABLE document TYPE option<string>;
DEFINE INDEX idx_document_tenant_collection ON TABLE document \
    COLUMNS tenant_id, collection;
";

/// Apply any pending migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
