//! Per-tenant daily request admission.

use chrono::Utc;
use strata_core::context::TenantSnapshot;
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::usage::METRIC_API_REQUESTS;
use strata_core::repository::UsageRepository;
use tracing::warn;

/// Admits requests against the tenant's daily API quota.
///
/// The counter day is always the current UTC date, so the quota
/// resets at midnight UTC regardless of tenant locale.
#[derive(Clone)]
pub struct AdmissionController<U: UsageRepository> {
    usage: U,
}

impl<U: UsageRepository> AdmissionController<U> {
    pub fn new(usage: U) -> Self {
        Self { usage }
    }

    /// Check the quota and account for one request in a single atomic
    /// step. Returns the post-increment amount, or `QuotaExceeded`
    /// with no counter side effect once the day's limit is spent.
    pub async fn check_and_account(&self, snapshot: &TenantSnapshot) -> StrataResult<i64> {
        let day = Utc::now().date_naive();

        let admitted = self
            .usage
            .try_increment(
                snapshot.tenant_id,
                METRIC_API_REQUESTS,
                day,
                snapshot.api_request_limit_per_day,
                snapshot.plan,
            )
            .await?;

        match admitted {
            Some(amount) => Ok(amount),
            None => {
                warn!(
                    tenant_id = %snapshot.tenant_id,
                    limit = snapshot.api_request_limit_per_day,
                    "daily request quota exhausted"
                );
                Err(StrataError::QuotaExceeded {
                    tenant_id: snapshot.tenant_id.to_string(),
                })
            }
        }
    }
}
