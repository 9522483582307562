//! Per-tenant usage counters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::tenant::PlanType;

/// Metric name for the daily API request quota.
pub const METRIC_API_REQUESTS: &str = "api_requests";

/// One counter per tenant, metric, and UTC day, created lazily on the
/// first request of the day.
///
/// `plan_at_capture` freezes the plan in effect when the counter was
/// first written, so mid-day plan changes do not corrupt historical
/// usage attribution during billing reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageCounter {
    pub tenant_id: Uuid,
    pub metric: String,
    pub day: NaiveDate,
    pub amount: i64,
    pub plan_at_capture: PlanType,
    pub updated_at: DateTime<Utc>,
}
