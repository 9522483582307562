//! Background job driver for per-tenant sweeps.
//!
//! The runner owns one [`TenantContext`] and re-binds it before each
//! tenant's iteration — the same sequential pattern a request follows,
//! minus the HTTP shape. Running tenants in parallel requires a
//! separate context per task; this driver is deliberately sequential.

use strata_core::context::{Actor, TenantContext, TenantScope, TenantSnapshot};
use strata_core::error::StrataResult;
use strata_core::repository::TenantRepository;
use tracing::{info, warn};

/// A unit of work executed once per tenant under that tenant's scope.
pub trait TenantJob: Send + Sync {
    fn name(&self) -> &str;

    /// Runs with the tenant's scope (System actor). Errors are
    /// reported per tenant and do not abort the sweep.
    fn run(&self, scope: &TenantScope) -> impl Future<Output = StrataResult<()>> + Send;
}

/// Summary of one sweep across all tenants.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub succeeded: u64,
    pub failed: u64,
}

/// Drives a [`TenantJob`] across every non-deleted tenant.
pub struct JobRunner<R: TenantRepository> {
    tenants: R,
}

impl<R: TenantRepository> JobRunner<R> {
    pub fn new(tenants: R) -> Self {
        Self { tenants }
    }

    /// Run `job` once per tenant, sequentially. A failing tenant is
    /// logged and counted; the sweep continues with the next tenant.
    pub async fn run_for_all_tenants<J: TenantJob>(&self, job: &J) -> StrataResult<JobReport> {
        let tenants = self.tenants.list_active().await?;
        let ctx = TenantContext::new();
        let mut report = JobReport::default();

        info!(job = job.name(), tenants = tenants.len(), "tenant sweep started");

        for tenant in &tenants {
            ctx.bind(TenantSnapshot::from_tenant(tenant));
            let scope = ctx.scope(Actor::System)?;

            match job.run(&scope).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    warn!(
                        job = job.name(),
                        tenant_id = %tenant.id,
                        error = %e,
                        "tenant job iteration failed"
                    );
                    report.failed += 1;
                }
            }
        }

        ctx.clear();
        info!(
            job = job.name(),
            succeeded = report.succeeded,
            failed = report.failed,
            "tenant sweep finished"
        );

        Ok(report)
    }
}
