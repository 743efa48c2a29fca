//! Role-permission matrix administration and tenant role seeding.

use custos_core::error::{CustosError, CustosResult};
use custos_core::models::permission::CreatePermission;
use custos_core::models::role::CreateRole;
use custos_core::repository::{
    CatalogRepository, ResourceKind, RoleRepository, TenantLookupRepository,
};
use custos_core::templates::{self, RoleTemplate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::guard::TenantGuard;

/// Per-role outcome of a seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedStatus {
    /// Role created and its template grants applied.
    Created { granted: usize },
    /// A role with this name already existed (case-insensitive).
    AlreadyExists,
    /// Role created but grant application failed; the role exists with
    /// zero grants and permission application can be retried alone.
    GrantsFailed { error: String },
}

#[derive(Debug, Clone)]
pub struct SeedOutcome {
    pub role: String,
    pub status: SeedStatus,
}

/// Report of a `seed_tenant` run, one outcome per template.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub outcomes: Vec<SeedOutcome>,
}

impl SeedReport {
    /// True when no template ended in `GrantsFailed`.
    pub fn is_complete(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|o| matches!(o.status, SeedStatus::GrantsFailed { .. }))
    }
}

/// Role-permission matrix edits, template application, and seeding.
pub struct RoleService<R, C, L>
where
    R: RoleRepository,
    C: CatalogRepository,
    L: TenantLookupRepository,
{
    roles: R,
    catalog: C,
    guard: TenantGuard<L>,
}

impl<R, C, L> RoleService<R, C, L>
where
    R: RoleRepository,
    C: CatalogRepository,
    L: TenantLookupRepository,
{
    pub fn new(roles: R, catalog: C, guard: TenantGuard<L>) -> Self {
        Self {
            roles,
            catalog,
            guard,
        }
    }

    /// Replace a role's entire grant set. The role must belong to the
    /// acting tenant and every permission id must exist in the
    /// catalog.
    pub async fn set_role_permissions(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        permission_ids: Vec<Uuid>,
    ) -> CustosResult<()> {
        self.guard
            .validate_bulk(ResourceKind::Role, tenant_id, &[role_id])
            .await?;

        for pid in &permission_ids {
            self.catalog.get_by_id(*pid).await?;
        }

        self.roles
            .set_role_permissions(role_id, permission_ids)
            .await
    }

    /// Apply a predefined template's capability set to a role.
    ///
    /// Template pairs missing from the catalog are skipped with a
    /// warning — a template may reference capabilities not yet
    /// registered in an older catalog. Returns the number of grants
    /// applied.
    pub async fn apply_template(
        &self,
        tenant_id: Uuid,
        role_id: Uuid,
        template_name: &str,
    ) -> CustosResult<usize> {
        self.guard
            .validate_bulk(ResourceKind::Role, tenant_id, &[role_id])
            .await?;

        let template =
            templates::find_template(template_name).ok_or_else(|| CustosError::Validation {
                message: format!("unknown role template: {template_name}"),
            })?;

        self.apply_template_grants(role_id, template).await
    }

    async fn apply_template_grants(
        &self,
        role_id: Uuid,
        template: &RoleTemplate,
    ) -> CustosResult<usize> {
        let mut permission_ids = Vec::with_capacity(template.grants.len());
        for (module, action) in template.grants {
            match self.catalog.find(module, action).await {
                Ok(permission) => permission_ids.push(permission.id),
                Err(CustosError::NotFound { .. }) => {
                    warn!(
                        template = template.name,
                        capability = format!("{module}:{action}"),
                        "template capability not in catalog; skipping"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let granted = permission_ids.len();
        self.roles
            .set_role_permissions(role_id, permission_ids)
            .await?;

        Ok(granted)
    }

    /// Ensure every predefined role template exists as a role for the
    /// tenant, applying its grants. Idempotent: existing roles (by
    /// case-insensitive name) are left untouched, and a uniqueness
    /// violation from a concurrent seeding run is treated as
    /// already-exists. Grant failures are reported per role, never
    /// fatal for the run.
    pub async fn seed_tenant(&self, tenant_id: Uuid) -> CustosResult<SeedReport> {
        let mut outcomes = Vec::with_capacity(templates::ROLE_TEMPLATES.len());

        for template in templates::ROLE_TEMPLATES {
            match self.roles.find_by_name(tenant_id, template.name).await {
                Ok(_) => {
                    outcomes.push(SeedOutcome {
                        role: template.name.into(),
                        status: SeedStatus::AlreadyExists,
                    });
                    continue;
                }
                Err(CustosError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }

            let role = match self
                .roles
                .create(CreateRole {
                    tenant_id,
                    name: template.name.into(),
                    is_default: true,
                    is_removable: template.is_removable,
                    scope: template.scope,
                })
                .await
            {
                Ok(role) => role,
                Err(create_err) => {
                    // Lost the race against a concurrent seeding run:
                    // the unique (tenant, name) index rejected the
                    // insert and the role now exists.
                    match self.roles.find_by_name(tenant_id, template.name).await {
                        Ok(_) => {
                            outcomes.push(SeedOutcome {
                                role: template.name.into(),
                                status: SeedStatus::AlreadyExists,
                            });
                            continue;
                        }
                        Err(CustosError::NotFound { .. }) => return Err(create_err),
                        Err(e) => return Err(e),
                    }
                }
            };

            match self.apply_template_grants(role.id, template).await {
                Ok(granted) => {
                    info!(
                        tenant_id = %tenant_id,
                        role = template.name,
                        granted,
                        "seeded role"
                    );
                    outcomes.push(SeedOutcome {
                        role: template.name.into(),
                        status: SeedStatus::Created { granted },
                    });
                }
                Err(e) => {
                    warn!(
                        tenant_id = %tenant_id,
                        role = template.name,
                        error = %e,
                        "role created but grant application failed"
                    );
                    outcomes.push(SeedOutcome {
                        role: template.name.into(),
                        status: SeedStatus::GrantsFailed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(SeedReport { outcomes })
    }

    /// Register any default capabilities missing from the catalog.
    /// Returns the number of newly registered entries.
    pub async fn seed_catalog(&self) -> CustosResult<usize> {
        let mut registered = 0;

        for (module, action, description) in templates::DEFAULT_CAPABILITIES {
            match self
                .catalog
                .register(CreatePermission {
                    module: (*module).into(),
                    action: (*action).into(),
                    description: (*description).into(),
                })
                .await
            {
                Ok(_) => registered += 1,
                Err(CustosError::DuplicateCapability { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(registered)
    }
}
