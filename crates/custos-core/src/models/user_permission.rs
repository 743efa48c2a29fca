//! Per-user permission overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-specific allow/deny that takes precedence over role grants.
///
/// At most one row exists per `(user_id, permission_id)` — grant and
/// revoke upsert the same row, differing only in `allowed`. The audit
/// trail is the current row's `granted_by` / `granted_at` / `reason`.
/// An expired row (`expires_at` in the past) is inert for resolution
/// but remains queryable for history; `expires_at` is never nulled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermission {
    pub user_id: Uuid,
    pub permission_id: Uuid,
    pub allowed: bool,
    pub granted_by: Uuid,
    pub granted_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl UserPermission {
    /// Whether the override still participates in resolution at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }
}

/// Input for the grant/revoke upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideWrite {
    pub user_id: Uuid,
    pub permission_id: Uuid,
    pub allowed: bool,
    pub granted_by: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}
