//! STRATA Tenancy — tenant directory, request resolution, admission
//! control, and per-tenant background jobs.

pub mod admission;
pub mod directory;
pub mod jobs;
pub mod resolver;

pub use admission::AdmissionController;
pub use directory::TenantDirectory;
pub use jobs::{JobReport, JobRunner, TenantJob};
pub use resolver::{InboundRequest, Resolution, TENANT_HEADER, TenantResolver};
