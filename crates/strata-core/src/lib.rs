//! STRATA Core — domain models, repository trait definitions, the
//! request-scoped tenant context, and the shared error taxonomy.

pub mod context;
pub mod error;
pub mod models;
pub mod permissions;
pub mod repository;

pub use context::{Actor, TenantContext, TenantScope, TenantSnapshot};
pub use error::{StrataError, StrataResult};
