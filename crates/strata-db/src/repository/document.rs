//! SurrealDB implementation of [`DocumentRepository`].
//!
//! Every query carries `tenant_id = $tenant_id` taken from the caller's
//! scope. Cross-tenant access is structurally impossible through this
//! repository: there is no code path that omits the filter, and writes
//! stamp the owning tenant over whatever the caller supplied.

use chrono::{DateTime, Utc};
use strata_core::context::TenantScope;
use strata_core::error::StrataResult;
use strata_core::models::document::{CreateDocument, Document};
use strata_core::repository::{DocumentRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct DocumentRow {
    tenant_id: String,
    collection: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl DocumentRow {
    fn into_document(self, id: Uuid) -> Result<Document, DbError> {
        Ok(Document {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            collection: self.collection,
            data: self.data,
            created_at: self.created_at,
            created_by: self.created_by,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            deleted_by: self.deleted_by,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    tenant_id: String,
    collection: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    deleted_by: Option<String>,
}

impl DocumentRowWithId {
    fn try_into_document(self) -> Result<Document, DbError> {
        let id = parse_uuid("document", &self.record_id)?;
        Ok(Document {
            id,
            tenant_id: parse_uuid("tenant", &self.tenant_id)?,
            collection: self.collection,
            data: self.data,
            created_at: self.created_at,
            created_by: self.created_by,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            deleted_by: self.deleted_by,
        })
    }
}

/// SurrealDB implementation of the Document repository.
#[derive(Clone)]
pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn insert(&self, scope: &TenantScope, input: CreateDocument) -> StrataResult<Document> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let actor = scope.actor.as_audit_value();

        let result = self
            .db
            .query(
                "CREATE type::record('document', $id) SET \
                 tenant_id = $tenant_id, \
                 collection = $collection, \
                 data = $data, \
                 created_by = $actor, \
                 updated_by = $actor",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", scope.tenant_id().to_string()))
            .bind(("collection", input.collection))
            .bind(("data", input.data))
            .bind(("actor", actor))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.into_document(id)?)
    }

    async fn get_by_id(
        &self,
        scope: &TenantScope,
        collection: &str,
        id: Uuid,
    ) -> StrataResult<Document> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('document', $id) \
                 WHERE tenant_id = $tenant_id \
                 AND collection = $collection \
                 AND is_deleted = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", scope.tenant_id().to_string()))
            .bind(("collection", collection.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.into_document(id)?)
    }

    async fn list(
        &self,
        scope: &TenantScope,
        collection: &str,
        pagination: Pagination,
    ) -> StrataResult<PaginatedResult<Document>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document \
                 WHERE tenant_id = $tenant_id \
                 AND collection = $collection \
                 AND is_deleted = false \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset; \
                 SELECT VALUE count() FROM document \
                 WHERE tenant_id = $tenant_id \
                 AND collection = $collection \
                 AND is_deleted = false \
                 GROUP ALL",
            )
            .bind(("tenant_id", scope.tenant_id().to_string()))
            .bind(("collection", collection.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<u64> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_document())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: counts.into_iter().next().unwrap_or(0),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(
        &self,
        scope: &TenantScope,
        collection: &str,
        id: Uuid,
        data: serde_json::Value,
    ) -> StrataResult<Document> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('document', $id) SET \
                 data = $data, \
                 updated_at = time::now(), \
                 updated_by = $actor \
                 WHERE tenant_id = $tenant_id \
                 AND collection = $collection \
                 AND is_deleted = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("data", data))
            .bind(("actor", scope.actor.as_audit_value()))
            .bind(("tenant_id", scope.tenant_id().to_string()))
            .bind(("collection", collection.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.into_document(id)?)
    }

    async fn soft_delete(
        &self,
        scope: &TenantScope,
        collection: &str,
        id: Uuid,
    ) -> StrataResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('document', $id) SET \
                 is_deleted = true, \
                 deleted_at = time::now(), \
                 deleted_by = $actor \
                 WHERE tenant_id = $tenant_id \
                 AND collection = $collection \
                 AND is_deleted = false \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id_str.clone()))
            .bind(("actor", scope.actor.as_audit_value()))
            .bind(("tenant_id", scope.tenant_id().to_string()))
            .bind(("collection", collection.to_string()))
            .await
            .map_err(DbError::from)?;

        let deleted: Vec<String> = result.take(0).map_err(DbError::from)?;
        if deleted.is_empty() {
            return Err(DbError::NotFound {
                entity: "document".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
