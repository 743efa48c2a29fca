//! Tenant isolation guard — cross-tenant reference validation.
//!
//! Every foreign id carried by an incoming operation (role id,
//! department id, target user id, ...) is checked against the actor's
//! tenant before the operation proceeds. The check is an existence
//! query scoped by both id and tenant, never a fetch-then-compare, so
//! nothing about another tenant's records is observable.
//!
//! This guard is orthogonal to permission resolution: an actor can be
//! authorized for an action in the abstract and still be blocked from
//! performing it on a specific foreign resource. Both checks are
//! mandatory; neither substitutes for the other.

use std::collections::HashMap;

use custos_core::error::{CustosError, CustosResult};
use custos_core::repository::{ResourceKind, ResourceRef, TenantLookupRepository};
use tracing::warn;
use uuid::Uuid;

/// Validates that referenced resources belong to the acting tenant.
#[derive(Clone)]
pub struct TenantGuard<L: TenantLookupRepository> {
    lookup: L,
}

impl<L: TenantLookupRepository> TenantGuard<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Validate a mixed batch of typed references against the actor's
    /// tenant. Fails with `IsolationViolation` naming the resource
    /// kind and every offending id of that kind.
    pub async fn validate_references(
        &self,
        tenant_id: Uuid,
        refs: &[ResourceRef],
    ) -> CustosResult<()> {
        let mut by_kind: HashMap<ResourceKind, Vec<Uuid>> = HashMap::new();
        for r in refs {
            by_kind.entry(r.kind).or_default().push(r.id);
        }

        for (kind, ids) in by_kind {
            self.validate_bulk(kind, tenant_id, &ids).await?;
        }

        Ok(())
    }

    /// Validate a batch of ids of one kind. The error carries the
    /// complete offending set, not just the first mismatch — operators
    /// need the whole contamination list to repair data.
    pub async fn validate_bulk(
        &self,
        kind: ResourceKind,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> CustosResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut unique: Vec<Uuid> = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let found = self
            .lookup
            .filter_in_tenant(kind, tenant_id, &unique)
            .await?;

        let offending: Vec<Uuid> = unique
            .into_iter()
            .filter(|id| !found.contains(id))
            .collect();

        if offending.is_empty() {
            return Ok(());
        }

        warn!(
            tenant_id = %tenant_id,
            resource = kind.label(),
            offending = ?offending,
            "cross-tenant reference rejected"
        );

        Err(CustosError::IsolationViolation {
            resource: kind.label().into(),
            ids: offending,
        })
    }
}
