//! SurrealDB implementation of [`RoleRepository`] — roles plus the
//! role-permission matrix.

use chrono::{DateTime, Utc};
use custos_core::error::{CustosError, CustosResult};
use custos_core::models::grant::RoleGrant;
use custos_core::models::permission::Permission;
use custos_core::models::role::{CreateRole, Role, RoleScope};
use custos_core::repository::{PaginatedResult, Pagination, RoleRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    tenant_id: String,
    name: String,
    is_default: bool,
    is_removable: bool,
    scope: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct RoleRowWithId {
    record_id: String,
    tenant_id: String,
    name: String,
    is_default: bool,
    is_removable: bool,
    scope: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_scope(scope: &str) -> Result<RoleScope, DbError> {
    match scope {
        "Tenant" => Ok(RoleScope::Tenant),
        "Department" => Ok(RoleScope::Department),
        other => Err(DbError::Conversion(format!("invalid role scope: {other}"))),
    }
}

fn scope_str(scope: RoleScope) -> &'static str {
    match scope {
        RoleScope::Tenant => "Tenant",
        RoleScope::Department => "Department",
    }
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Result<Role, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Conversion(format!("invalid tenant UUID: {e}")))?;
        Ok(Role {
            id,
            tenant_id,
            name: self.name,
            is_default: self.is_default,
            is_removable: self.is_removable,
            scope: parse_scope(&self.scope)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl RoleRowWithId {
    pub(crate) fn try_into_role(self) -> Result<Role, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Conversion(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Conversion(format!("invalid tenant UUID: {e}")))?;
        Ok(Role {
            id,
            tenant_id,
            name: self.name,
            is_default: self.is_default,
            is_removable: self.is_removable,
            scope: parse_scope(&self.scope)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct GrantRow {
    permission_id: String,
    allowed: bool,
}

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    module: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Role repository and
/// role-permission matrix.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> CustosResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        // name_key backs the per-tenant case-insensitive uniqueness
        // index; the seeder relies on it under concurrent onboarding.
        let name_key = input.name.to_lowercase();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 tenant_id = $tenant_id, \
                 name = $name, name_key = $name_key, \
                 is_default = $is_default, \
                 is_removable = $is_removable, \
                 scope = $scope",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", input.name))
            .bind(("name_key", name_key))
            .bind(("is_default", input.is_default))
            .bind(("is_removable", input.is_removable))
            .bind(("scope", scope_str(input.scope)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CustosResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('role', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str.clone(),
        })?;

        let role = row.into_role(id)?;
        if role.tenant_id != tenant_id {
            warn!(
                role_id = %id,
                expected_tenant = %tenant_id,
                actual_tenant = %role.tenant_id,
                "tenant mismatch on role fetch; discarding record"
            );
            return Err(DbError::NotFound {
                entity: "role".into(),
                id: id_str,
            }
            .into());
        }

        Ok(role)
    }

    async fn find_by_name(&self, tenant_id: Uuid, name: &str) -> CustosResult<Role> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE tenant_id = $tenant_id \
                 AND name_key = $name_key",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("name_key", name.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: name.to_string(),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CustosResult<()> {
        let role = self.get_by_id(tenant_id, id).await?;
        if !role.is_removable {
            return Err(CustosError::Validation {
                message: format!("role '{}' is a protected system role", role.name),
            });
        }

        let id_str = id.to_string();

        // A role still held by any user cannot be deleted.
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user_role \
                 WHERE role_id = $id GROUP ALL; \
                 SELECT count() AS total FROM user_department_role \
                 WHERE role_id = $id GROUP ALL;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let global: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let department: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let holders = global.first().map(|r| r.total).unwrap_or(0)
            + department.first().map(|r| r.total).unwrap_or(0);

        if holders > 0 {
            return Err(CustosError::RoleInUse { id });
        }

        // Grants cascade with the role so no orphaned matrix rows
        // survive.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE role_permission WHERE role_id = $id; \
                 DELETE type::record('role', $id) \
                 WHERE tenant_id = $tenant_id; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> CustosResult<PaginatedResult<Role>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM role \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn set_role_permissions(
        &self,
        role_id: Uuid,
        permission_ids: Vec<Uuid>,
    ) -> CustosResult<()> {
        let role_id_str = role_id.to_string();
        let permission_id_strs: Vec<String> =
            permission_ids.iter().map(|p| p.to_string()).collect();

        // Delete-all-then-insert inside one transaction: failure rolls
        // the whole replacement back rather than leaving a mixed state.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE role_permission WHERE role_id = $role_id; \
                 FOR $pid IN $permission_ids { \
                     UPSERT type::record('role_permission', [$role_id, $pid]) SET \
                     role_id = $role_id, \
                     permission_id = $pid, \
                     allowed = true; \
                 }; \
                 COMMIT TRANSACTION;",
            )
            .bind(("role_id", role_id_str))
            .bind(("permission_ids", permission_id_strs))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn upsert_grant(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
        allowed: bool,
    ) -> CustosResult<()> {
        self.db
            .query(
                "UPSERT type::record('role_permission', [$role_id, $permission_id]) SET \
                 role_id = $role_id, \
                 permission_id = $permission_id, \
                 allowed = $allowed",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("permission_id", permission_id.to_string()))
            .bind(("allowed", allowed))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_role_permissions(&self, role_id: Uuid) -> CustosResult<Vec<RoleGrant>> {
        let mut result = self
            .db
            .query("SELECT permission_id, allowed FROM role_permission WHERE role_id = $role_id")
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let grant_rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        if grant_rows.is_empty() {
            return Ok(Vec::new());
        }

        let permission_ids: Vec<String> =
            grant_rows.iter().map(|g| g.permission_id.clone()).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE meta::id(id) IN $permission_ids \
                 ORDER BY module ASC, action ASC",
            )
            .bind(("permission_ids", permission_ids))
            .await
            .map_err(DbError::from)?;

        let permission_rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let allowed_by_id: std::collections::HashMap<String, bool> = grant_rows
            .into_iter()
            .map(|g| (g.permission_id, g.allowed))
            .collect();

        let mut grants = Vec::with_capacity(permission_rows.len());
        for row in permission_rows {
            let allowed = allowed_by_id
                .get(&row.record_id)
                .copied()
                .unwrap_or(false);
            let id = Uuid::parse_str(&row.record_id)
                .map_err(|e| DbError::Conversion(format!("invalid UUID: {e}")))?;
            grants.push(RoleGrant {
                permission: Permission {
                    id,
                    module: row.module,
                    action: row.action,
                    description: row.description,
                    created_at: row.created_at,
                },
                allowed,
            });
        }

        Ok(grants)
    }

    async fn any_role_allows(&self, role_ids: &[Uuid], permission_id: Uuid) -> CustosResult<bool> {
        if role_ids.is_empty() {
            return Ok(false);
        }

        let role_id_strs: Vec<String> = role_ids.iter().map(|r| r.to_string()).collect();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM role_permission \
                 WHERE role_id IN $role_ids \
                 AND permission_id = $permission_id \
                 AND allowed = true GROUP ALL",
            )
            .bind(("role_ids", role_id_strs))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}
