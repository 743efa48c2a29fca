//! SurrealDB implementation of [`CatalogRepository`].
//!
//! The catalog is the one global table: no tenant scoping anywhere in
//! this file, by design.

use chrono::{DateTime, Utc};
use custos_core::error::{CustosError, CustosResult};
use custos_core::models::permission::{CreatePermission, Permission};
use custos_core::repository::CatalogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    module: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    module: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Conversion(format!("invalid UUID: {e}")))?;
        Ok(Permission {
            id,
            module: self.module,
            action: self.action,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the permission catalog.
#[derive(Clone)]
pub struct SurrealCatalogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCatalogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn lookup(&self, module: &str, action: &str) -> CustosResult<Option<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE module = $module AND action = $action",
            )
            .bind(("module", module.to_string()))
            .bind(("action", action.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_permission()?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> CatalogRepository for SurrealCatalogRepository<C> {
    async fn register(&self, input: CreatePermission) -> CustosResult<Permission> {
        if self.lookup(&input.module, &input.action).await?.is_some() {
            return Err(CustosError::DuplicateCapability {
                module: input.module,
                action: input.action,
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 module = $module, action = $action, \
                 description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("module", input.module.clone()))
            .bind(("action", input.action.clone()))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let checked = match result.check() {
            Ok(r) => r,
            Err(_) => {
                // The unique index on (module, action) closes the race
                // between the pre-check and the insert.
                if self.lookup(&input.module, &input.action).await?.is_some() {
                    return Err(CustosError::DuplicateCapability {
                        module: input.module,
                        action: input.action,
                    });
                }
                return Err(CustosError::StoreUnavailable(format!(
                    "failed to register capability {}:{}",
                    input.module, input.action
                )));
            }
        };

        let mut checked = checked;
        let rows: Vec<PermissionRow> = checked.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(Permission {
            id,
            module: row.module,
            action: row.action,
            description: row.description,
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> CustosResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id: id_str,
        })?;

        Ok(Permission {
            id,
            module: row.module,
            action: row.action,
            description: row.description,
            created_at: row.created_at,
        })
    }

    async fn find(&self, module: &str, action: &str) -> CustosResult<Permission> {
        self.lookup(module, action)
            .await?
            .ok_or_else(|| CustosError::NotFound {
                entity: "permission".into(),
                id: format!("{module}:{action}"),
            })
    }

    async fn list(&self) -> CustosResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY module ASC, action ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }

    async fn delete(&self, id: Uuid) -> CustosResult<()> {
        // Existence first, so an unknown id reports NotFound rather
        // than silently succeeding.
        self.get_by_id(id).await?;

        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM role_permission \
                 WHERE permission_id = $id GROUP ALL",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let references = count_rows.first().map(|r| r.total).unwrap_or(0);

        if references > 0 {
            return Err(CustosError::CapabilityInUse { id });
        }

        self.db
            .query("DELETE type::record('permission', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
