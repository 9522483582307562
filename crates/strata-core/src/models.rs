//! Domain models for STRATA.
//!
//! These are the core types shared across all crates.

pub mod document;
pub mod membership;
pub mod refresh_token;
pub mod role;
pub mod tenant;
pub mod usage;
pub mod user;
