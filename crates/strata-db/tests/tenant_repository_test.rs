//! Integration tests for the Tenant repository using in-memory SurrealDB.

use strata_core::error::StrataError;
use strata_core::models::tenant::{CreateTenant, PlanType, TenantStatus, UpdateTenant};
use strata_core::repository::TenantRepository;
use strata_db::SurrealTenantRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    strata_db::run_migrations(&db).await.unwrap();
    db
}

fn acme() -> CreateTenant {
    CreateTenant {
        name: "Acme Corp".into(),
        slug: "acme-corp".into(),
        subdomain: Some("acme".into()),
        schema: "tenant_acme".into(),
        plan: PlanType::Standard,
        api_request_limit_per_day: 1000,
        storage_limit_mb: 1024,
        settings: None,
    }
}

#[tokio::test]
async fn create_and_get_by_id() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(acme()).await.unwrap();
    assert_eq!(tenant.slug, "acme-corp");
    assert_eq!(tenant.plan, PlanType::Standard);
    assert_eq!(tenant.status, TenantStatus::Active);
    assert!(!tenant.is_deleted);

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.name, "Acme Corp");
    assert_eq!(fetched.api_request_limit_per_day, 1000);
}

#[tokio::test]
async fn get_by_slug_and_subdomain() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(acme()).await.unwrap();

    let by_slug = repo.get_by_slug("acme-corp").await.unwrap();
    assert_eq!(by_slug.id, tenant.id);

    let by_subdomain = repo.get_by_subdomain("acme").await.unwrap();
    assert_eq!(by_subdomain.id, tenant.id);

    let missing = repo.get_by_slug("nope").await;
    assert!(matches!(missing, Err(StrataError::NotFound { .. })));
}

#[tokio::test]
async fn duplicate_slug_rejected() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    repo.create(acme()).await.unwrap();

    let mut dup = acme();
    dup.subdomain = Some("acme2".into());
    let result = repo.create(dup).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn update_plan_and_status() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(acme()).await.unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                plan: Some(PlanType::Premium),
                status: Some(TenantStatus::Suspended),
                api_request_limit_per_day: Some(100_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.plan, PlanType::Premium);
    assert_eq!(updated.status, TenantStatus::Suspended);
    assert_eq!(updated.api_request_limit_per_day, 100_000);
    // Untouched fields survive.
    assert_eq!(updated.slug, "acme-corp");
}

#[tokio::test]
async fn soft_deleted_tenant_is_invisible() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo.create(acme()).await.unwrap();
    repo.soft_delete(tenant.id).await.unwrap();

    assert!(matches!(
        repo.get_by_id(tenant.id).await,
        Err(StrataError::NotFound { .. })
    ));
    assert!(matches!(
        repo.get_by_slug("acme-corp").await,
        Err(StrataError::NotFound { .. })
    ));
    assert!(matches!(
        repo.get_by_subdomain("acme").await,
        Err(StrataError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_active_skips_deleted() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let a = repo.create(acme()).await.unwrap();
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

    repo.soft_delete(a.id).await.unwrap();

    let active = repo.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
}
