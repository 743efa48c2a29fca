//! Role assignment records.
//!
//! Tenant-wide assignments are keyed by `(user, role)` alone and carry
//! no record type of their own; department-restricted assignments
//! (`UserDepartmentRole`) do, because the handover transaction reads
//! them back. Both carry the central isolation invariant — the role
//! (and department) must belong to the same tenant as the user. The
//! guard enforces it before every write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role assignment scoped to one department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDepartmentRole {
    pub user_id: Uuid,
    pub department_id: Uuid,
    pub role_id: Uuid,
    pub is_primary_department: bool,
    pub is_primary_role: bool,
}

/// Input for creating a department-scoped assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDepartmentRole {
    pub user_id: Uuid,
    pub department_id: Uuid,
    pub role_id: Uuid,
    pub is_primary_department: bool,
    pub is_primary_role: bool,
}
