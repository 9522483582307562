//! Request-scoped tenant context.
//!
//! A [`TenantContext`] is a mutable cell created once per request (or
//! once per background worker loop) and bound by the resolver. It is
//! never a process-wide singleton: concurrent requests each own their
//! own cell, and a job driver re-binds a single cell sequentially
//! between tenant iterations.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StrataError, StrataResult};
use crate::models::tenant::{PlanType, Tenant, TenantStatus};

/// Immutable copy of the tenant attributes a request needs.
///
/// Built by the resolver from the directory record; lives for exactly
/// one request or one job iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSnapshot {
    pub tenant_id: Uuid,
    pub schema: String,
    pub plan: PlanType,
    pub status: TenantStatus,
    pub api_request_limit_per_day: i64,
    pub storage_limit_mb: i64,
}

impl TenantSnapshot {
    pub fn from_tenant(tenant: &Tenant) -> Self {
        Self {
            tenant_id: tenant.id,
            schema: tenant.schema.clone(),
            plan: tenant.plan,
            status: tenant.status,
            api_request_limit_per_day: tenant.api_request_limit_per_day,
            storage_limit_mb: tenant.storage_limit_mb,
        }
    }
}

/// The identity performing a data access, recorded in audit stamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    User(Uuid),
    /// Sentinel for unauthenticated and background contexts.
    System,
}

impl Actor {
    pub fn as_audit_value(&self) -> String {
        match self {
            Actor::User(id) => id.to_string(),
            Actor::System => "system".into(),
        }
    }
}

/// Snapshot + actor, passed explicitly into every tenant-scoped data
/// access. Constructed from a bound [`TenantContext`].
#[derive(Debug, Clone)]
pub struct TenantScope {
    pub tenant: TenantSnapshot,
    pub actor: Actor,
}

impl TenantScope {
    pub fn new(tenant: TenantSnapshot, actor: Actor) -> Self {
        Self { tenant, actor }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant.tenant_id
    }
}

/// Mutable request/job-scoped cell holding the resolved snapshot.
///
/// Clones share the same cell, so a handler and the repositories it
/// calls observe the same binding.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    inner: Arc<RwLock<Option<TenantSnapshot>>>,
}

impl TenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the context to a resolved tenant. Re-binding replaces the
    /// previous snapshot (the job driver relies on this between
    /// tenant iterations).
    pub fn bind(&self, snapshot: TenantSnapshot) {
        *self.inner.write().expect("tenant context lock poisoned") = Some(snapshot);
    }

    pub fn clear(&self) {
        *self.inner.write().expect("tenant context lock poisoned") = None;
    }

    pub fn is_bound(&self) -> bool {
        self.inner
            .read()
            .expect("tenant context lock poisoned")
            .is_some()
    }

    /// The currently bound snapshot, or [`StrataError::TenantContext`]
    /// when resolution has not run (or was bypassed).
    pub fn current(&self) -> StrataResult<TenantSnapshot> {
        self.inner
            .read()
            .expect("tenant context lock poisoned")
            .clone()
            .ok_or(StrataError::TenantContext)
    }

    /// Convenience: current snapshot coupled with an actor, ready to
    /// hand to a repository.
    pub fn scope(&self, actor: Actor) -> StrataResult<TenantScope> {
        Ok(TenantScope::new(self.current()?, actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid) -> TenantSnapshot {
        TenantSnapshot {
            tenant_id: id,
            schema: "tenant_a".into(),
            plan: PlanType::Standard,
            status: TenantStatus::Active,
            api_request_limit_per_day: 1000,
            storage_limit_mb: 1024,
        }
    }

    #[test]
    fn unbound_context_errors() {
        let ctx = TenantContext::new();
        assert!(!ctx.is_bound());
        assert!(matches!(
            ctx.current().unwrap_err(),
            StrataError::TenantContext
        ));
    }

    #[test]
    fn bind_and_rebind() {
        let ctx = TenantContext::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        ctx.bind(snapshot(a));
        assert_eq!(ctx.current().unwrap().tenant_id, a);

        ctx.bind(snapshot(b));
        assert_eq!(ctx.current().unwrap().tenant_id, b);

        ctx.clear();
        assert!(ctx.current().is_err());
    }

    #[test]
    fn clones_share_the_cell() {
        let ctx = TenantContext::new();
        let other = ctx.clone();
        let id = Uuid::new_v4();

        ctx.bind(snapshot(id));
        assert_eq!(other.current().unwrap().tenant_id, id);
    }

    #[test]
    fn separate_contexts_do_not_interfere() {
        let a = TenantContext::new();
        let b = TenantContext::new();
        a.bind(snapshot(Uuid::new_v4()));
        assert!(b.current().is_err());
    }

    #[test]
    fn system_actor_audit_value() {
        assert_eq!(Actor::System.as_audit_value(), "system");
        let id = Uuid::new_v4();
        assert_eq!(Actor::User(id).as_audit_value(), id.to_string());
    }
}
