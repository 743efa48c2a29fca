//! Permission (capability) catalog model.
//!
//! The catalog is the one genuinely global table in the system: a
//! shared registry of `(module, action)` capability identifiers. It is
//! deliberately un-tenanted — cross-tenant leakage can only occur
//! through roles, grants, and assignments, never through the catalog
//! itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry identifying a protectable operation.
///
/// `(module, action)` is unique across the catalog. Entries are
/// immutable once referenced by a role grant and deletable only while
/// unreferenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    /// Functional area, e.g. `document`, `meeting`, `audit`.
    pub module: String,
    /// The action within the module, e.g. `view`, `approve`.
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    /// Canonical `module:action` form used in logs.
    pub fn capability(&self) -> String {
        format!("{}:{}", self.module, self.action)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub module: String,
    pub action: String,
    pub description: String,
}
