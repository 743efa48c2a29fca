//! SurrealDB implementation of [`TenantLookupRepository`].
//!
//! The existence query is scoped by both id and tenant in a single
//! predicate — a record in another tenant is indistinguishable from a
//! record that does not exist, so the check leaks nothing across the
//! boundary.

use custos_core::error::CustosResult;
use custos_core::repository::{ResourceKind, TenantLookupRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

/// SurrealDB implementation of tenant-scoped existence checks.
#[derive(Clone)]
pub struct SurrealTenantLookupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantLookupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantLookupRepository for SurrealTenantLookupRepository<C> {
    async fn filter_in_tenant(
        &self,
        kind: ResourceKind,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> CustosResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Table names come from the ResourceKind enum, never from
        // caller input.
        let table = kind.label();
        let id_strs: Vec<String> = ids.iter().map(|i| i.to_string()).collect();

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id FROM {table} \
                 WHERE tenant_id = $tenant_id \
                 AND meta::id(id) IN $ids"
            ))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("ids", id_strs))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;

        let found = rows
            .into_iter()
            .map(|row| {
                Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Conversion(format!("invalid UUID: {e}")))
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(found)
    }
}
