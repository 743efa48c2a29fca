//! SurrealDB implementation of [`DepartmentRepository`].

use chrono::{DateTime, Utc};
use custos_core::error::CustosResult;
use custos_core::models::department::{CreateDepartment, Department, UpdateDepartment};
use custos_core::repository::{DepartmentRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::warn;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DepartmentRow {
    tenant_id: String,
    name: String,
    hod_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DepartmentRowWithId {
    record_id: String,
    tenant_id: String,
    name: String,
    hod_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_hod(hod_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    hod_id
        .map(|h| {
            Uuid::parse_str(&h).map_err(|e| DbError::Conversion(format!("invalid hod UUID: {e}")))
        })
        .transpose()
}

impl DepartmentRow {
    fn into_department(self, id: Uuid) -> Result<Department, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Conversion(format!("invalid tenant UUID: {e}")))?;
        Ok(Department {
            id,
            tenant_id,
            name: self.name,
            hod_id: parse_hod(self.hod_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl DepartmentRowWithId {
    fn try_into_department(self) -> Result<Department, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Conversion(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Conversion(format!("invalid tenant UUID: {e}")))?;
        Ok(Department {
            id,
            tenant_id,
            name: self.name,
            hod_id: parse_hod(self.hod_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Department repository.
#[derive(Clone)]
pub struct SurrealDepartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDepartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DepartmentRepository for SurrealDepartmentRepository<C> {
    async fn create(&self, input: CreateDepartment) -> CustosResult<Department> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('department', $id) SET \
                 tenant_id = $tenant_id, \
                 name = $name, hod_id = $hod_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", input.name))
            .bind(("hod_id", input.hod_id.map(|h| h.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id_str,
        })?;

        Ok(row.into_department(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CustosResult<Department> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('department', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id_str.clone(),
        })?;

        let department = row.into_department(id)?;
        if department.tenant_id != tenant_id {
            warn!(
                department_id = %id,
                expected_tenant = %tenant_id,
                actual_tenant = %department.tenant_id,
                "tenant mismatch on department fetch; discarding record"
            );
            return Err(DbError::NotFound {
                entity: "department".into(),
                id: id_str,
            }
            .into());
        }

        Ok(department)
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDepartment,
    ) -> CustosResult<Department> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('department', $id) SET {} \
             WHERE tenant_id = $tenant_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DepartmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: id_str,
        })?;

        Ok(row.into_department(id)?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> CustosResult<PaginatedResult<Department>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM department \
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
                "SELECT meta::id(id) AS record_id, * FROM department \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_department())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
