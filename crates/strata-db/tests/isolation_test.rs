//! Integration tests for tenant isolation on the Document repository.
//!
//! A document written under one tenant's scope must be unreachable
//! through any operation carrying another tenant's scope, even when
//! the record id is known.

use serde_json::json;
use strata_core::context::{Actor, TenantScope, TenantSnapshot};
use strata_core::error::StrataError;
use strata_core::models::document::CreateDocument;
use strata_core::models::tenant::{PlanType, TenantStatus};
use strata_core::repository::{DocumentRepository, Pagination};
use strata_db::SurrealDocumentRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    strata_db::run_migrations(&db).await.unwrap();
    db
}

fn scope_for(tenant_id: Uuid, actor: Actor) -> TenantScope {
    TenantScope::new(
        TenantSnapshot {
            tenant_id,
            schema: format!("tenant_{tenant_id}"),
            plan: PlanType::Standard,
            status: TenantStatus::Active,
            api_request_limit_per_day: 1000,
            storage_limit_mb: 1024,
        },
        actor,
    )
}

fn product(name: &str) -> CreateDocument {
    CreateDocument {
        collection: "products".into(),
        data: json!({ "name": name }),
    }
}

#[tokio::test]
async fn insert_stamps_tenant_and_actor() {
    let db = setup().await;
    let repo = SurrealDocumentRepository::new(db);
    let tenant_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let scope = scope_for(tenant_id, Actor::User(user_id));

    let doc = repo.insert(&scope, product("Widget")).await.unwrap();

    assert_eq!(doc.tenant_id, tenant_id);
    assert_eq!(doc.created_by, user_id.to_string());
    assert_eq!(doc.updated_by, user_id.to_string());
    assert_eq!(doc.data["name"], "Widget");
    assert!(!doc.is_deleted);
}

#[tokio::test]
async fn document_is_invisible_to_other_tenants() {
    let db = setup().await;
    let repo = SurrealDocumentRepository::new(db);
    let scope_a = scope_for(Uuid::new_v4(), Actor::System);
    let scope_b = scope_for(Uuid::new_v4(), Actor::System);

    let doc = repo.insert(&scope_a, product("Secret")).await.unwrap();

    // Direct read with the known id under the wrong scope.
    let result = repo.get_by_id(&scope_b, "products", doc.id).await;
    assert!(matches!(result, Err(StrataError::NotFound { .. })));

    // Listing under the wrong scope sees nothing.
    let listed = repo
        .list(&scope_b, "products", Pagination::default())
        .await
        .unwrap();
    assert!(listed.items.is_empty());
    assert_eq!(listed.total, 0);

    // The owner still sees it.
    let fetched = repo.get_by_id(&scope_a, "products", doc.id).await.unwrap();
    assert_eq!(fetched.id, doc.id);
}

#[tokio::test]
async fn update_is_scoped_and_stamps_actor() {
    let db = setup().await;
    let repo = SurrealDocumentRepository::new(db);
    let scope_a = scope_for(Uuid::new_v4(), Actor::System);
    let scope_b = scope_for(Uuid::new_v4(), Actor::System);

    let doc = repo.insert(&scope_a, product("Original")).await.unwrap();

    // Cross-tenant update fails and leaves the document untouched.
    let result = repo
        .update(&scope_b, "products", doc.id, json!({ "name": "Hijacked" }))
        .await;
    assert!(matches!(result, Err(StrataError::NotFound { .. })));

    let editor = Uuid::new_v4();
    let updated = repo
        .update(
            &scope_for(scope_a.tenant_id(), Actor::User(editor)),
            "products",
            doc.id,
            json!({ "name": "Renamed" }),
        )
        .await
        .unwrap();
    assert_eq!(updated.data["name"], "Renamed");
    assert_eq!(updated.updated_by, editor.to_string());
    // The creator stamp is immutable.
    assert_eq!(updated.created_by, "system");
}

#[tokio::test]
async fn soft_delete_is_scoped_and_hides_the_document() {
    let db = setup().await;
    let repo = SurrealDocumentRepository::new(db);
    let scope_a = scope_for(Uuid::new_v4(), Actor::System);
    let scope_b = scope_for(Uuid::new_v4(), Actor::System);

    let doc = repo.insert(&scope_a, product("Doomed")).await.unwrap();

    // Cross-tenant delete fails.
    let result = repo.soft_delete(&scope_b, "products", doc.id).await;
    assert!(matches!(result, Err(StrataError::NotFound { .. })));

    repo.soft_delete(&scope_a, "products", doc.id).await.unwrap();

    // Gone from reads and lists, even for the owner.
    assert!(matches!(
        repo.get_by_id(&scope_a, "products", doc.id).await,
        Err(StrataError::NotFound { .. })
    ));
    let listed = repo
        .list(&scope_a, "products", Pagination::default())
        .await
        .unwrap();
    assert!(listed.items.is_empty());

    // Deleting again is a not-found, not a second delete.
    assert!(matches!(
        repo.soft_delete(&scope_a, "products", doc.id).await,
        Err(StrataError::NotFound { .. })
    ));
}

#[tokio::test]
async fn collections_partition_within_a_tenant() {
    let db = setup().await;
    let repo = SurrealDocumentRepository::new(db);
    let scope = scope_for(Uuid::new_v4(), Actor::System);

    let doc = repo.insert(&scope, product("Widget")).await.unwrap();
    repo.insert(
        &scope,
        CreateDocument {
            collection: "orders".into(),
            data: json!({ "total": 42 }),
        },
    )
    .await
    .unwrap();

    // A known id is not reachable through the wrong collection.
    assert!(matches!(
        repo.get_by_id(&scope, "orders", doc.id).await,
        Err(StrataError::NotFound { .. })
    ));

    let products = repo
        .list(&scope, "products", Pagination::default())
        .await
        .unwrap();
    assert_eq!(products.total, 1);
    assert_eq!(products.items[0].id, doc.id);
}

#[tokio::test]
async fn list_paginates() {
    let db = setup().await;
    let repo = SurrealDocumentRepository::new(db);
    let scope = scope_for(Uuid::new_v4(), Actor::System);

    for i in 0..5 {
        repo.insert(&scope, product(&format!("Item {i}")))
            .await
            .unwrap();
    }

    let page = repo
        .list(
            &scope,
            "products",
            Pagination {
                offset: 2,
                limit: 2,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 5);
    assert_eq!(page.offset, 2);
    assert_eq!(page.limit, 2);
}
