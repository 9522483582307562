//! Integration tests for the tenant job driver.

use serde_json::json;
use strata_core::context::{Actor, TenantScope};
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::document::CreateDocument;
use strata_core::models::tenant::{CreateTenant, PlanType, Tenant};
use strata_core::repository::{DocumentRepository, Pagination, TenantRepository};
use strata_db::{SurrealDocumentRepository, SurrealTenantRepository};
use strata_tenancy::{JobRunner, TenantJob};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (Surreal<Db>, SurrealTenantRepository<Db>, Tenant, Tenant) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    strata_db::run_migrations(&db).await.unwrap();

    let repo = SurrealTenantRepository::new(db.clone());
    let a = repo
        .create(CreateTenant {
            name: "Acme Corp".into(),
            slug: "acme-corp".into(),
            subdomain: None,
            schema: "tenant_acme".into(),
            plan: PlanType::Standard,
            api_request_limit_per_day: 1000,
            storage_limit_mb: 1024,
            settings: None,
        })
        .await
        .unwrap();
    let b = repo
        .create(CreateTenant {
            name: "Globex".into(),
            slug: "globex".into(),
            subdomain: None,
            schema: "tenant_globex".into(),
            plan: PlanType::Free,
            api_request_limit_per_day: 100,
            storage_limit_mb: 256,
            settings: None,
        })
        .await
        .unwrap();

    (db, repo, a, b)
}

/// Writes one marker document into the tenant's own partition.
struct MarkerJob {
    documents: SurrealDocumentRepository<Db>,
}

impl TenantJob for MarkerJob {
    fn name(&self) -> &str {
        "marker"
    }

    async fn run(&self, scope: &TenantScope) -> StrataResult<()> {
        self.documents
            .insert(
                scope,
                CreateDocument {
                    collection: "sweep_markers".into(),
                    data: json!({ "swept": true }),
                },
            )
            .await?;
        Ok(())
    }
}

/// Fails for one designated tenant, succeeds for the rest.
struct FlakyJob {
    poison: Uuid,
}

impl TenantJob for FlakyJob {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn run(&self, scope: &TenantScope) -> StrataResult<()> {
        if scope.tenant_id() == self.poison {
            return Err(StrataError::Internal("synthetic failure".into()));
        }
        Ok(())
    }
}

#[tokio::test]
async fn sweep_runs_under_each_tenants_scope() {
    let (db, tenant_repo, a, b) = setup().await;
    let documents = SurrealDocumentRepository::new(db.clone());
    let runner = JobRunner::new(tenant_repo);

    let report = runner
        .run_for_all_tenants(&MarkerJob {
            documents: documents.clone(),
        })
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);

    // Each tenant sees exactly its own marker, stamped by the System
    // actor.
    for tenant in [&a, &b] {
        let scope = TenantScope::new(
            strata_core::context::TenantSnapshot::from_tenant(tenant),
            Actor::System,
        );
        let markers = documents
            .list(&scope, "sweep_markers", Pagination::default())
            .await
            .unwrap();
        assert_eq!(markers.total, 1);
        assert_eq!(markers.items[0].tenant_id, tenant.id);
        assert_eq!(markers.items[0].created_by, "system");
    }
}

#[tokio::test]
async fn a_failing_tenant_does_not_abort_the_sweep() {
    let (_db, tenant_repo, a, _b) = setup().await;
    let runner = JobRunner::new(tenant_repo);

    let report = runner
        .run_for_all_tenants(&FlakyJob { poison: a.id })
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn deleted_tenants_are_skipped() {
    let (_db, tenant_repo, a, _b) = setup().await;
    tenant_repo.soft_delete(a.id).await.unwrap();

    let runner = JobRunner::new(tenant_repo);
    let report = runner
        .run_for_all_tenants(&FlakyJob { poison: a.id })
        .await
        .unwrap();

    // Only the surviving tenant was visited, and the poison tenant
    // never ran.
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
}
