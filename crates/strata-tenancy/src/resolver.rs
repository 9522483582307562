//! Tenant resolution from inbound request shape.
//!
//! Resolution runs before any handler: it derives a tenant candidate
//! from the request, checks it against the directory, and binds the
//! request's [`TenantContext`]. It has no other side effect and is
//! idempotent, so a retried request resolves identically.

use strata_core::context::{TenantContext, TenantSnapshot};
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::tenant::TenantStatus;
use strata_core::repository::TenantRepository;
use tracing::debug;
use uuid::Uuid;

use crate::directory::TenantDirectory;

/// Header carrying an explicit tenant id; takes precedence over the
/// subdomain.
pub const TENANT_HEADER: &str = "X-Tenant-ID";

/// Paths that bypass tenant resolution entirely.
const EXEMPT_PREFIXES: &[&str] = &["/docs", "/health"];

/// The shape of an inbound request the resolver needs.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Request path, starting with `/`.
    pub path: String,
    /// Host header value (may carry a port).
    pub host: String,
    /// `X-Tenant-ID` header value, if present.
    pub tenant_header: Option<String>,
}

/// Outcome of tenant resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The path is exempt; no tenant was bound.
    Exempt,
    /// A tenant was resolved and bound to the supplied context.
    Resolved(TenantSnapshot),
}

/// Tenant candidate derived from the request, before lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Candidate {
    Id(Uuid),
    Subdomain(String),
}

/// Resolves the owning tenant for each inbound request.
#[derive(Clone)]
pub struct TenantResolver<R: TenantRepository> {
    directory: TenantDirectory<R>,
}

impl<R: TenantRepository> TenantResolver<R> {
    pub fn new(directory: TenantDirectory<R>) -> Self {
        Self { directory }
    }

    /// Resolve the request's tenant and bind `ctx` on success.
    ///
    /// Exempt paths return [`Resolution::Exempt`] without touching the
    /// context. A request with no derivable candidate fails with
    /// `TenantNotResolvable`; an unknown candidate with
    /// `TenantNotFound`; a suspended or disabled tenant with
    /// `TenantNotActive`.
    pub async fn resolve(
        &self,
        request: &InboundRequest,
        ctx: &TenantContext,
    ) -> StrataResult<Resolution> {
        if is_exempt(&request.path) {
            return Ok(Resolution::Exempt);
        }

        let candidate = derive_candidate(request).ok_or(StrataError::TenantNotResolvable)?;

        let (tenant, candidate_label) = match &candidate {
            Candidate::Id(id) => (self.directory.by_id(*id).await?, id.to_string()),
            Candidate::Subdomain(label) => {
                (self.directory.by_subdomain(label).await?, label.clone())
            }
        };

        let tenant = tenant.ok_or(StrataError::TenantNotFound {
            candidate: candidate_label,
        })?;

        if tenant.status != TenantStatus::Active {
            return Err(StrataError::TenantNotActive {
                tenant_id: tenant.id.to_string(),
            });
        }

        let snapshot = TenantSnapshot::from_tenant(&tenant);
        ctx.bind(snapshot.clone());
        debug!(tenant_id = %tenant.id, path = %request.path, "tenant resolved");

        Ok(Resolution::Resolved(snapshot))
    }
}

fn is_exempt(path: &str) -> bool {
    path == "/" || EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Header UUID first; otherwise the leftmost host label when the host
/// has at least three dot-separated labels (`acme.api.example.com`).
/// A bare or two-label host carries no tenant information.
fn derive_candidate(request: &InboundRequest) -> Option<Candidate> {
    if let Some(raw) = &request.tenant_header
        && let Ok(id) = Uuid::parse_str(raw.trim())
    {
        return Some(Candidate::Id(id));
    }

    let host = request.host.split(':').next().unwrap_or("");
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 3 && !labels[0].is_empty() {
        return Some(Candidate::Subdomain(labels[0].to_lowercase()));
    }

    None
}
