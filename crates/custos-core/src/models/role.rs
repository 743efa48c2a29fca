//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a role applies tenant-wide or only within a department
/// assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleScope {
    Tenant,
    Department,
}

/// A tenant-scoped named bundle of capability grants.
///
/// A role's `tenant_id` never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Seeded from a predefined template rather than hand-created.
    pub is_default: bool,
    /// Seeded system roles are protected from deletion.
    pub is_removable: bool,
    pub scope: RoleScope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub tenant_id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub is_removable: bool,
    pub scope: RoleScope,
}
