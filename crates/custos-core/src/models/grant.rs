//! Role-permission grant records.

use serde::{Deserialize, Serialize};

/// A grant joined with its catalog entry, as returned by
/// `get_role_permissions`. At most one grant exists per
/// `(role_id, permission_id)` pair — edits upsert, never duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    pub permission: super::permission::Permission,
    pub allowed: bool,
}
