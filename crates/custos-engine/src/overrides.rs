//! Per-user override administration.
//!
//! Grant and revoke are the same upsert with opposite `allowed` flags;
//! removal deletes the row and reverts the user to pure role-based
//! resolution. Every mutation validates the target user against the
//! acting tenant first.

use chrono::{DateTime, Utc};
use custos_core::error::CustosResult;
use custos_core::models::actor::Actor;
use custos_core::models::user_permission::{OverrideWrite, UserPermission};
use custos_core::repository::{
    CatalogRepository, OverrideRepository, ResourceKind, TenantLookupRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::guard::TenantGuard;

/// Input for granting or revoking an override.
#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub target_user: Uuid,
    pub permission_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// Administers the per-user override store.
pub struct OverrideService<O, C, L>
where
    O: OverrideRepository,
    C: CatalogRepository,
    L: TenantLookupRepository,
{
    overrides: O,
    catalog: C,
    guard: TenantGuard<L>,
}

impl<O, C, L> OverrideService<O, C, L>
where
    O: OverrideRepository,
    C: CatalogRepository,
    L: TenantLookupRepository,
{
    pub fn new(overrides: O, catalog: C, guard: TenantGuard<L>) -> Self {
        Self {
            overrides,
            catalog,
            guard,
        }
    }

    /// Grant a capability to a user regardless of their roles.
    pub async fn grant(&self, actor: Actor, request: OverrideRequest) -> CustosResult<UserPermission> {
        self.write(actor, request, true).await
    }

    /// Revoke a capability from a user regardless of their roles.
    pub async fn revoke(
        &self,
        actor: Actor,
        request: OverrideRequest,
    ) -> CustosResult<UserPermission> {
        self.write(actor, request, false).await
    }

    async fn write(
        &self,
        actor: Actor,
        request: OverrideRequest,
        allowed: bool,
    ) -> CustosResult<UserPermission> {
        self.guard
            .validate_bulk(ResourceKind::User, actor.tenant_id, &[request.target_user])
            .await?;

        let permission = self.catalog.get_by_id(request.permission_id).await?;

        let written = self
            .overrides
            .upsert(OverrideWrite {
                user_id: request.target_user,
                permission_id: request.permission_id,
                allowed,
                granted_by: actor.user_id,
                expires_at: request.expires_at,
                reason: request.reason,
            })
            .await?;

        info!(
            target_user = %request.target_user,
            capability = permission.capability(),
            allowed,
            granted_by = %actor.user_id,
            expires_at = ?written.expires_at,
            "override written"
        );

        Ok(written)
    }

    /// Delete the override row entirely, reverting the target user to
    /// role-based resolution for this capability.
    pub async fn remove(
        &self,
        actor: Actor,
        target_user: Uuid,
        permission_id: Uuid,
    ) -> CustosResult<()> {
        self.guard
            .validate_bulk(ResourceKind::User, actor.tenant_id, &[target_user])
            .await?;

        self.overrides.remove(target_user, permission_id).await?;

        info!(
            target_user = %target_user,
            permission_id = %permission_id,
            removed_by = %actor.user_id,
            "override removed"
        );

        Ok(())
    }
}
