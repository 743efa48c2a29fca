//! SurrealDB implementation of [`AssignmentRepository`].
//!
//! Assignment rows use composite array record ids
//! (`user_role:[user, role]`, `user_department_role:[user, dept,
//! role]`), so upserts are keyed structurally and the handover
//! transaction can address exactly the rows it means to touch.

use custos_core::error::CustosResult;
use custos_core::models::assignment::{AssignDepartmentRole, UserDepartmentRole};
use custos_core::models::role::Role;
use custos_core::repository::AssignmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::role::RoleRowWithId;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleIdRow {
    role_id: String,
}

#[derive(Debug, SurrealValue)]
struct DepartmentRoleRow {
    user_id: String,
    department_id: String,
    role_id: String,
    is_primary_department: bool,
    is_primary_role: bool,
}

impl DepartmentRoleRow {
    fn try_into_assignment(self) -> Result<UserDepartmentRole, DbError> {
        let parse = |label: &str, value: &str| {
            Uuid::parse_str(value)
                .map_err(|e| DbError::Conversion(format!("invalid {label} UUID: {e}")))
        };
        Ok(UserDepartmentRole {
            user_id: parse("user", &self.user_id)?,
            department_id: parse("department", &self.department_id)?,
            role_id: parse("role", &self.role_id)?,
            is_primary_department: self.is_primary_department,
            is_primary_role: self.is_primary_role,
        })
    }
}

/// SurrealDB implementation of the role-assignment repository.
#[derive(Clone)]
pub struct SurrealAssignmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAssignmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AssignmentRepository for SurrealAssignmentRepository<C> {
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid, is_default: bool) -> CustosResult<()> {
        self.db
            .query(
                "UPSERT type::record('user_role', [$user_id, $role_id]) SET \
                 user_id = $user_id, \
                 role_id = $role_id, \
                 is_default = $is_default",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .bind(("is_default", is_default))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn unassign_role(&self, user_id: Uuid, role_id: Uuid) -> CustosResult<()> {
        self.db
            .query("DELETE type::record('user_role', [$user_id, $role_id])")
            .bind(("user_id", user_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn assign_department_role(&self, input: AssignDepartmentRole) -> CustosResult<()> {
        self.db
            .query(
                "UPSERT type::record('user_department_role', \
                 [$user_id, $department_id, $role_id]) SET \
                 user_id = $user_id, \
                 department_id = $department_id, \
                 role_id = $role_id, \
                 is_primary_department = $is_primary_department, \
                 is_primary_role = $is_primary_role",
            )
            .bind(("user_id", input.user_id.to_string()))
            .bind(("department_id", input.department_id.to_string()))
            .bind(("role_id", input.role_id.to_string()))
            .bind(("is_primary_department", input.is_primary_department))
            .bind(("is_primary_role", input.is_primary_role))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn unassign_department_role(
        &self,
        user_id: Uuid,
        department_id: Uuid,
        role_id: Uuid,
    ) -> CustosResult<()> {
        self.db
            .query(
                "DELETE type::record('user_department_role', \
                 [$user_id, $department_id, $role_id])",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("department_id", department_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn roles_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> CustosResult<Vec<Role>> {
        let user_id_str = user_id.to_string();

        // Two queries: tenant-wide assignments + department-scoped
        // assignments.
        let mut result = self
            .db
            .query(
                "SELECT role_id FROM user_role \
                 WHERE user_id = $user_id; \
                 SELECT role_id FROM user_department_role \
                 WHERE user_id = $user_id;",
            )
            .bind(("user_id", user_id_str))
            .await
            .map_err(DbError::from)?;

        let global: Vec<RoleIdRow> = result.take(0).map_err(DbError::from)?;
        let department: Vec<RoleIdRow> = result.take(1).map_err(DbError::from)?;

        // Merge and deduplicate by role id.
        let mut seen = std::collections::HashSet::new();
        let mut role_ids = Vec::new();
        for row in global.into_iter().chain(department) {
            if seen.insert(row.role_id.clone()) {
                role_ids.push(row.role_id);
            }
        }

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        // The role lookup is tenant-scoped: an assignment pointing at
        // a foreign role never resolves into this tenant's role set.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE tenant_id = $tenant_id \
                 AND meta::id(id) IN $role_ids",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("role_ids", role_ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn department_roles_for_user(
        &self,
        user_id: Uuid,
    ) -> CustosResult<Vec<UserDepartmentRole>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM user_department_role \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRoleRow> = result.take(0).map_err(DbError::from)?;

        let assignments = rows
            .into_iter()
            .map(|row| row.try_into_assignment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(assignments)
    }

    async fn handover_headship(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
        outgoing: Uuid,
        incoming: Uuid,
        privileged_role_id: Uuid,
        baseline_role_id: Uuid,
    ) -> CustosResult<()> {
        // All three writes commit or none do. The composite record ids
        // scope the downgrade strictly to this department: the
        // outgoing user's privileged assignments elsewhere are not
        // addressed by any statement here.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE type::record('department', $department_id) SET \
                 hod_id = $incoming, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id; \
                 DELETE type::record('user_department_role', \
                 [$outgoing, $department_id, $privileged_role]); \
                 UPSERT type::record('user_department_role', \
                 [$outgoing, $department_id, $baseline_role]) SET \
                 user_id = $outgoing, \
                 department_id = $department_id, \
                 role_id = $baseline_role, \
                 is_primary_department = false, \
                 is_primary_role = false; \
                 DELETE type::record('user_department_role', \
                 [$incoming, $department_id, $baseline_role]); \
                 UPSERT type::record('user_department_role', \
                 [$incoming, $department_id, $privileged_role]) SET \
                 user_id = $incoming, \
                 department_id = $department_id, \
                 role_id = $privileged_role, \
                 is_primary_department = false, \
                 is_primary_role = true; \
                 COMMIT TRANSACTION;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("department_id", department_id.to_string()))
            .bind(("outgoing", outgoing.to_string()))
            .bind(("incoming", incoming.to_string()))
            .bind(("privileged_role", privileged_role_id.to_string()))
            .bind(("baseline_role", baseline_role_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }
}
