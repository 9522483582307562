//! Strata Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations for the `strata-core` traits
//!
//! Tenant-owned data goes through [`SurrealDocumentRepository`], which
//! filters every statement by the caller's tenant scope.

mod connection;
mod error;
mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::{
    SurrealDocumentRepository, SurrealMembershipRepository, SurrealRefreshTokenRepository,
    SurrealRoleRepository, SurrealTenantRepository, SurrealUsageRepository, SurrealUserRepository,
};
pub use schema::{run_migrations, schema_v1};
