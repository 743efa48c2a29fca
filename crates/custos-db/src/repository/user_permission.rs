//! SurrealDB implementation of [`OverrideRepository`].
//!
//! Grant and revoke upsert the same `(user, permission)` row; expiry
//! is filtered at read time for resolution (`get_active`) but the row
//! itself stays queryable for history (`get`, `list_for_user`).
//! `expires_at` is never nulled out.

use chrono::{DateTime, Utc};
use custos_core::error::CustosResult;
use custos_core::models::user_permission::{OverrideWrite, UserPermission};
use custos_core::repository::OverrideRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OverrideRow {
    user_id: String,
    permission_id: String,
    allowed: bool,
    granted_by: String,
    granted_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    reason: Option<String>,
}

impl OverrideRow {
    fn try_into_override(self) -> Result<UserPermission, DbError> {
        let parse = |label: &str, value: &str| {
            Uuid::parse_str(value)
                .map_err(|e| DbError::Conversion(format!("invalid {label} UUID: {e}")))
        };
        Ok(UserPermission {
            user_id: parse("user", &self.user_id)?,
            permission_id: parse("permission", &self.permission_id)?,
            allowed: self.allowed,
            granted_by: parse("grantor", &self.granted_by)?,
            granted_at: self.granted_at,
            expires_at: self.expires_at,
            reason: self.reason,
        })
    }
}

/// SurrealDB implementation of the per-user override store.
#[derive(Clone)]
pub struct SurrealOverrideRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOverrideRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OverrideRepository for SurrealOverrideRepository<C> {
    async fn upsert(&self, input: OverrideWrite) -> CustosResult<UserPermission> {
        let user_id_str = input.user_id.to_string();
        let permission_id_str = input.permission_id.to_string();

        let result = self
            .db
            .query(
                "UPSERT type::record('user_permission', \
                 [$user_id, $permission_id]) SET \
                 user_id = $user_id, \
                 permission_id = $permission_id, \
                 allowed = $allowed, \
                 granted_by = $granted_by, \
                 granted_at = time::now(), \
                 expires_at = $expires_at, \
                 reason = $reason",
            )
            .bind(("user_id", user_id_str.clone()))
            .bind(("permission_id", permission_id_str.clone()))
            .bind(("allowed", input.allowed))
            .bind(("granted_by", input.granted_by.to_string()))
            .bind(("expires_at", input.expires_at))
            .bind(("reason", input.reason))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_permission".into(),
            id: format!("{user_id_str}/{permission_id_str}"),
        })?;

        Ok(row.try_into_override()?)
    }

    async fn remove(&self, user_id: Uuid, permission_id: Uuid) -> CustosResult<()> {
        self.db
            .query(
                "DELETE type::record('user_permission', \
                 [$user_id, $permission_id])",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get(&self, user_id: Uuid, permission_id: Uuid) -> CustosResult<UserPermission> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('user_permission', \
                 [$user_id, $permission_id])",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_permission".into(),
            id: format!("{user_id}/{permission_id}"),
        })?;

        Ok(row.try_into_override()?)
    }

    async fn get_active(
        &self,
        user_id: Uuid,
        permission_id: Uuid,
    ) -> CustosResult<UserPermission> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('user_permission', \
                 [$user_id, $permission_id]) \
                 WHERE expires_at = NONE OR expires_at > time::now()",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_permission".into(),
            id: format!("{user_id}/{permission_id}"),
        })?;

        Ok(row.try_into_override()?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> CustosResult<Vec<UserPermission>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM user_permission \
                 WHERE user_id = $user_id \
                 ORDER BY granted_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OverrideRow> = result.take(0).map_err(DbError::from)?;

        let overrides = rows
            .into_iter()
            .map(|row| row.try_into_override())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(overrides)
    }
}
