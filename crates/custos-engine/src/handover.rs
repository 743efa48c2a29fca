//! Department headship handover.
//!
//! The one place several invariants change together: the department's
//! head reference, the outgoing holder's role assignment, and the
//! incoming holder's role assignment. All references are
//! tenant-validated up front, then the three writes go through one
//! atomic transaction — a concurrent resolution check sees either the
//! old headship or the new one, never a torn intermediate.

use custos_core::error::{CustosError, CustosResult};
use custos_core::repository::{
    AssignmentRepository, DepartmentRepository, ResourceKind, ResourceRef, RoleRepository,
    TenantLookupRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::guard::TenantGuard;

/// Executes atomic headship handovers.
pub struct HandoverService<D, R, A, L>
where
    D: DepartmentRepository,
    R: RoleRepository,
    A: AssignmentRepository,
    L: TenantLookupRepository,
{
    departments: D,
    roles: R,
    assignments: A,
    guard: TenantGuard<L>,
    config: EngineConfig,
}

impl<D, R, A, L> HandoverService<D, R, A, L>
where
    D: DepartmentRepository,
    R: RoleRepository,
    A: AssignmentRepository,
    L: TenantLookupRepository,
{
    pub fn new(
        departments: D,
        roles: R,
        assignments: A,
        guard: TenantGuard<L>,
        config: EngineConfig,
    ) -> Self {
        Self {
            departments,
            roles,
            assignments,
            guard,
            config,
        }
    }

    /// Reassign a department's headship from `outgoing` to `incoming`.
    ///
    /// Afterwards the department's `hod_id` is `incoming`, `incoming`
    /// holds the privileged role for the department, and `outgoing`
    /// holds the baseline role there instead. The downgrade is scoped
    /// strictly to this department: the outgoing user keeps the
    /// privileged role in any other department where they hold it.
    pub async fn handover(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
        outgoing: Uuid,
        incoming: Uuid,
    ) -> CustosResult<()> {
        if outgoing == incoming {
            return Err(CustosError::Validation {
                message: "headship handover requires two distinct users".into(),
            });
        }

        self.guard
            .validate_references(
                tenant_id,
                &[
                    ResourceRef::new(ResourceKind::Department, department_id),
                    ResourceRef::new(ResourceKind::User, outgoing),
                    ResourceRef::new(ResourceKind::User, incoming),
                ],
            )
            .await?;

        let department = self.departments.get_by_id(tenant_id, department_id).await?;
        if department.hod_id != Some(outgoing) {
            return Err(CustosError::Validation {
                message: format!(
                    "user {outgoing} is not the current head of department {department_id}"
                ),
            });
        }

        let privileged = self
            .roles
            .find_by_name(tenant_id, &self.config.headship_role)
            .await?;
        let baseline = self
            .roles
            .find_by_name(tenant_id, &self.config.baseline_role)
            .await?;

        self.assignments
            .handover_headship(
                tenant_id,
                department_id,
                outgoing,
                incoming,
                privileged.id,
                baseline.id,
            )
            .await?;

        info!(
            tenant_id = %tenant_id,
            department_id = %department_id,
            outgoing = %outgoing,
            incoming = %incoming,
            "headship handed over"
        );

        Ok(())
    }
}
