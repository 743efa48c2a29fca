//! Effective-permission resolution.
//!
//! This is the authorization entry point: every privileged operation
//! calls [`AccessResolver::resolve`] before performing its domain
//! action. Precedence is fixed — sentinel bypass, then the per-user
//! override, then the union of role grants. Absence of anything
//! (catalog entry, role, grant) resolves to deny, never an error; only
//! store failures propagate, and callers must treat those as deny.

use custos_core::error::{CustosError, CustosResult};
use custos_core::models::actor::Actor;
use custos_core::models::decision::Decision;
use custos_core::repository::{
    AssignmentRepository, CatalogRepository, OverrideRepository, RoleRepository,
};
use tracing::debug;

use crate::config::EngineConfig;

/// Resolves a single allow/deny decision for an actor and capability.
pub struct AccessResolver<A, C, O, R>
where
    A: AssignmentRepository,
    C: CatalogRepository,
    O: OverrideRepository,
    R: RoleRepository,
{
    assignments: A,
    catalog: C,
    overrides: O,
    roles: R,
    config: EngineConfig,
}

impl<A, C, O, R> AccessResolver<A, C, O, R>
where
    A: AssignmentRepository,
    C: CatalogRepository,
    O: OverrideRepository,
    R: RoleRepository,
{
    pub fn new(assignments: A, catalog: C, overrides: O, roles: R, config: EngineConfig) -> Self {
        Self {
            assignments,
            catalog,
            overrides,
            roles,
            config,
        }
    }

    /// Resolve whether `actor` may perform `module:action`.
    pub async fn resolve(&self, actor: Actor, module: &str, action: &str) -> CustosResult<Decision> {
        // 0. Sentinel bypass, by role-name comparison only. This must
        //    not depend on the catalog or matrix so it keeps working
        //    even when both are empty or corrupted.
        let held_roles = self
            .assignments
            .roles_for_user(actor.tenant_id, actor.user_id)
            .await?;

        if held_roles
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(&self.config.bypass_role))
        {
            debug!(
                user_id = %actor.user_id,
                capability = format!("{module}:{action}"),
                "bypass role held; allowing"
            );
            return Ok(Decision::Allow);
        }

        // 1. An unregistered capability can never be granted.
        let permission = match self.catalog.find(module, action).await {
            Ok(p) => p,
            Err(CustosError::NotFound { .. }) => {
                debug!(
                    capability = format!("{module}:{action}"),
                    "capability not in catalog; denying"
                );
                return Ok(Decision::Deny);
            }
            Err(e) => return Err(e),
        };

        // 2. An active override is the final answer in either
        //    direction.
        match self
            .overrides
            .get_active(actor.user_id, permission.id)
            .await
        {
            Ok(ov) => {
                debug!(
                    user_id = %actor.user_id,
                    capability = permission.capability(),
                    allowed = ov.allowed,
                    "override in effect"
                );
                return Ok(if ov.allowed {
                    Decision::Allow
                } else {
                    Decision::Deny
                });
            }
            Err(CustosError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // 3/4. No roles, no access.
        if held_roles.is_empty() {
            return Ok(Decision::Deny);
        }

        // 5. Role grants are unioned: one allow row from any held role
        //    suffices, and a deny row in one role does not veto an
        //    allow from another.
        let role_ids: Vec<_> = held_roles.iter().map(|r| r.id).collect();
        let allowed = self
            .roles
            .any_role_allows(&role_ids, permission.id)
            .await?;

        debug!(
            user_id = %actor.user_id,
            capability = permission.capability(),
            allowed,
            "resolved from role grants"
        );

        Ok(if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        })
    }
}
