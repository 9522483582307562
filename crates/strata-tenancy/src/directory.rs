//! Read-through tenant directory cache.

use std::time::Duration;

use moka::future::Cache;
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::tenant::Tenant;
use strata_core::repository::TenantRepository;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_TTL: Duration = Duration::from_secs(600);
const DEFAULT_CAPACITY: u64 = 10_000;

/// Read-through cache over the tenant repository.
///
/// Cache keys are prefixed by lookup type (`id:` / `slug:` /
/// `subdomain:`) so entries are never shared across key types;
/// slug and subdomain keys are lowercased. Negative results are not
/// cached — an unknown tenant becomes visible the moment it is
/// created.
#[derive(Clone)]
pub struct TenantDirectory<R: TenantRepository> {
    repo: R,
    cache: Cache<String, Tenant>,
}

impl<R: TenantRepository> TenantDirectory<R> {
    pub fn new(repo: R) -> Self {
        Self::with_ttl(repo, DEFAULT_TTL)
    }

    pub fn with_ttl(repo: R, ttl: Duration) -> Self {
        Self {
            repo,
            cache: Cache::builder()
                .max_capacity(DEFAULT_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn by_id(&self, id: Uuid) -> StrataResult<Option<Tenant>> {
        let key = format!("id:{id}");
        self.lookup(key, self.repo.get_by_id(id)).await
    }

    pub async fn by_slug(&self, slug: &str) -> StrataResult<Option<Tenant>> {
        let key = format!("slug:{}", slug.to_lowercase());
        self.lookup(key, self.repo.get_by_slug(slug)).await
    }

    pub async fn by_subdomain(&self, subdomain: &str) -> StrataResult<Option<Tenant>> {
        let key = format!("subdomain:{}", subdomain.to_lowercase());
        self.lookup(key, self.repo.get_by_subdomain(subdomain)).await
    }

    /// Evict every cached key for a tenant. Called after tenant
    /// mutations so stale attributes never outlive the change by more
    /// than one lookup.
    pub async fn invalidate(&self, tenant: &Tenant) {
        self.cache.invalidate(&format!("id:{}", tenant.id)).await;
        self.cache
            .invalidate(&format!("slug:{}", tenant.slug.to_lowercase()))
            .await;
        if let Some(subdomain) = &tenant.subdomain {
            self.cache
                .invalidate(&format!("subdomain:{}", subdomain.to_lowercase()))
                .await;
        }
    }

    async fn lookup(
        &self,
        key: String,
        fetch: impl Future<Output = StrataResult<Tenant>>,
    ) -> StrataResult<Option<Tenant>> {
        if let Some(tenant) = self.cache.get(&key).await {
            debug!(key = %key, "tenant directory cache hit");
            return Ok(Some(tenant));
        }

        match fetch.await {
            Ok(tenant) => {
                self.cache.insert(key, tenant.clone()).await;
                Ok(Some(tenant))
            }
            Err(StrataError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
