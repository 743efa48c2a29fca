//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Link tables (grants,
//! assignments, overrides) use composite array record ids so that
//! at-most-one-row-per-key is structural, with unique indexes backing
//! the same invariant for any raw insert path.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope — the isolation boundary itself)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD domain ON TABLE tenant TYPE string;
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['Active', 'Suspended'];
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_domain ON TABLE tenant COLUMNS domain UNIQUE;

-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_username ON TABLE user \
    COLUMNS tenant_id, username UNIQUE;

-- =======================================================================
-- Departments (tenant scope)
-- =======================================================================
DEFINE TABLE department SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE department TYPE string;
DEFINE FIELD name ON TABLE department TYPE string;
DEFINE FIELD hod_id ON TABLE department TYPE option<string>;
DEFINE FIELD created_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_department_tenant_name ON TABLE department \
    COLUMNS tenant_id, name UNIQUE;

-- =======================================================================
-- Permission catalog (global scope — intentionally shared)
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD module ON TABLE permission TYPE string;
DEFINE FIELD action ON TABLE permission TYPE string;
DEFINE FIELD description ON TABLE permission TYPE string;
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_capability ON TABLE permission \
    COLUMNS module, action UNIQUE;

-- =======================================================================
-- Roles (tenant scope)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE role TYPE string;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD name_key ON TABLE role TYPE string;
DEFINE FIELD is_default ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD is_removable ON TABLE role TYPE bool DEFAULT true;
DEFINE FIELD scope ON TABLE role TYPE string \
    ASSERT $value IN ['Tenant', 'Department'];
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_tenant_name ON TABLE role \
    COLUMNS tenant_id, name_key UNIQUE;

-- =======================================================================
-- Role-permission grants (record id: [role_id, permission_id])
-- =======================================================================
DEFINE TABLE role_permission SCHEMAFULL;
DEFINE FIELD role_id ON TABLE role_permission TYPE string;
DEFINE FIELD permission_id ON TABLE role_permission TYPE string;
DEFINE FIELD allowed ON TABLE role_permission TYPE bool DEFAULT true;
DEFINE INDEX idx_role_permission_pair ON TABLE role_permission \
    COLUMNS role_id, permission_id UNIQUE;

-- =======================================================================
-- Tenant-wide role assignments (record id: [user_id, role_id])
-- =======================================================================
DEFINE TABLE user_role SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_role TYPE string;
DEFINE FIELD role_id ON TABLE user_role TYPE string;
DEFINE FIELD is_default ON TABLE user_role TYPE bool DEFAULT false;
DEFINE INDEX idx_user_role_pair ON TABLE user_role \
    COLUMNS user_id, role_id UNIQUE;

-- =======================================================================
-- Department-scoped role assignments
-- (record id: [user_id, department_id, role_id])
-- =======================================================================
DEFINE TABLE user_department_role SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_department_role TYPE string;
DEFINE FIELD department_id ON TABLE user_department_role TYPE string;
DEFINE FIELD role_id ON TABLE user_department_role TYPE string;
DEFINE FIELD is_primary_department ON TABLE user_department_role \
    TYPE bool DEFAULT false;
DEFINE FIELD is_primary_role ON TABLE user_department_role \
    TYPE bool DEFAULT false;
DEFINE INDEX idx_user_department_role_triple \
    ON TABLE user_department_role \
    COLUMNS user_id, department_id, role_id UNIQUE;

-- =======================================================================
-- Per-user overrides (record id: [user_id, permission_id])
-- =======================================================================
DEFINE TABLE user_permission SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_permission TYPE string;
DEFINE FIELD permission_id ON TABLE user_permission TYPE string;
DEFINE FIELD allowed ON TABLE user_permission TYPE bool;
DEFINE FIELD granted_by ON TABLE user_permission TYPE string;
DEFINE FIELD granted_at ON TABLE user_permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD expires_at ON TABLE user_permission \
    TYPE option<datetime>;
DEFINE FIELD reason ON TABLE user_permission TYPE option<string>;
DEFINE INDEX idx_user_permission_pair ON TABLE user_permission \
    COLUMNS user_id, permission_id UNIQUE;
";

/// Apply any pending migrations, tracking the applied version in the
/// `_migration` table.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
