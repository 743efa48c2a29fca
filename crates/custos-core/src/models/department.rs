//! Department domain model.
//!
//! A department is a tenant-scoped organizational unit. Its headship
//! (`hod_id`) is a weak, single-holder reference to a user, not an
//! ownership relation: reassigning it is the handover transaction's
//! job and must stay inside the department's tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    /// Current head of department, if one is designated.
    /// Invariant: the referenced user belongs to `tenant_id`.
    pub hod_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub tenant_id: Uuid,
    pub name: String,
    pub hod_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDepartment {
    pub name: Option<String>,
}
