//! SurrealDB implementation of [`UsageRepository`].
//!
//! Counter records use a deterministic id of `{tenant}:{metric}:{day}`
//! so the lazy create and the increment always land on the same row.
//! Increments are serialized through a repository-level mutex and run
//! the check-and-increment in one transaction, so concurrent callers
//! cannot observe lost updates or overshoot the limit.

use std::sync::Arc;

use chrono::NaiveDate;
use strata_core::error::StrataResult;
use strata_core::models::tenant::PlanType;
use strata_core::repository::UsageRepository;
use surrealdb::{Connection, Surreal};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::plan_to_str;

fn counter_id(tenant_id: Uuid, metric: &str, day: NaiveDate) -> String {
    format!("{tenant_id}:{metric}:{day}")
}

/// SurrealDB implementation of the Usage repository.
#[derive(Clone)]
pub struct SurrealUsageRepository<C: Connection> {
    db: Surreal<C>,
    write_lock: Arc<Mutex<()>>,
}

impl<C: Connection> SurrealUsageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl<C: Connection> UsageRepository for SurrealUsageRepository<C> {
    async fn try_increment(
        &self,
        tenant_id: Uuid,
        metric: &str,
        day: NaiveDate,
        limit: i64,
        plan: PlanType,
    ) -> StrataResult<Option<i64>> {
        let _guard = self.write_lock.lock().await;

        // The UPSERT lazily creates the counter (amount defaults to 0)
        // and freezes plan_at_capture on first write; the conditional
        // UPDATE matches nothing once the quota is spent, leaving the
        // counter untouched.
        let mut result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 UPSERT type::record('usage_counter', $id) SET \
                     tenant_id = $tenant_id, \
                     metric = $metric, \
                     day = $day, \
                     plan_at_capture = plan_at_capture ?? $plan; \
                 UPDATE type::record('usage_counter', $id) SET \
                     amount += 1, updated_at = time::now() \
                     WHERE amount < $limit \
                     RETURN VALUE amount; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", counter_id(tenant_id, metric, day)))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("metric", metric.to_string()))
            .bind(("day", day.to_string()))
            .bind(("plan", plan_to_str(plan)))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        // Statement indices include BEGIN, so the UPDATE's RETURN
        // VALUE lands at index 2, not 1.
        let amounts: Vec<i64> = result.take(2).map_err(DbError::from)?;

        Ok(amounts.into_iter().next())
    }

    async fn amount_for_day(
        &self,
        tenant_id: Uuid,
        metric: &str,
        day: NaiveDate,
    ) -> StrataResult<i64> {
        let mut result = self
            .db
            .query("SELECT VALUE amount FROM type::record('usage_counter', $id)")
            .bind(("id", counter_id(tenant_id, metric, day)))
            .await
            .map_err(DbError::from)?;

        let amounts: Vec<i64> = result.take(0).map_err(DbError::from)?;

        Ok(amounts.into_iter().next().unwrap_or(0))
    }
}
