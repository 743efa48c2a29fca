//! Predefined role templates and the default capability catalog.
//!
//! Templates map a role name to the capability set it starts with.
//! They are resolved against the live catalog at application time;
//! pairs missing from the catalog are skipped with a warning rather
//! than treated as fatal, so a template may safely reference
//! capabilities not yet registered in an older catalog.

use crate::models::role::RoleScope;

/// Sentinel role name reserved for system operators.
///
/// Holders bypass permission resolution entirely. The check is by name
/// comparison only, never by catalog lookup, so it keeps functioning
/// even if the catalog or matrix is empty or corrupted.
pub const BYPASS_ROLE: &str = "SuperAdmin";

/// Privileged role a department head holds for their department.
pub const HEADSHIP_ROLE: &str = "HOD";

/// Baseline role an outgoing head is downgraded to on handover.
pub const BASELINE_ROLE: &str = "Staff";

/// A predefined role template.
#[derive(Debug, Clone, Copy)]
pub struct RoleTemplate {
    pub name: &'static str,
    pub scope: RoleScope,
    pub is_removable: bool,
    /// `(module, action)` pairs granted by default.
    pub grants: &'static [(&'static str, &'static str)],
}

/// Default capability catalog shipped with the backend:
/// `(module, action, description)`.
pub const DEFAULT_CAPABILITIES: &[(&str, &str, &str)] = &[
    ("document", "view", "View documents"),
    ("document", "create", "Create and upload documents"),
    ("document", "update", "Edit document metadata and content"),
    ("document", "delete", "Delete documents"),
    ("document", "approve", "Approve documents for publication"),
    ("meeting", "view", "View meetings and agendas"),
    ("meeting", "schedule", "Schedule meetings"),
    ("meeting", "update", "Edit meeting details"),
    ("meeting", "cancel", "Cancel meetings"),
    ("meeting", "minutes", "Record and publish meeting minutes"),
    ("audit", "view", "View audit programs"),
    ("audit", "create", "Create audit programs"),
    ("audit", "update", "Edit audit programs"),
    ("audit", "assign", "Assign auditors to programs"),
    ("audit", "close", "Close completed audit programs"),
    ("notification", "view", "View notifications"),
    ("notification", "send", "Send notifications"),
    ("department", "view", "View departments"),
    ("department", "create", "Create departments"),
    ("department", "update", "Edit departments"),
    ("department", "delete", "Delete departments"),
    ("user", "view", "View users"),
    ("user", "create", "Create users"),
    ("user", "update", "Edit users"),
    ("user", "deactivate", "Deactivate users"),
    ("role", "view", "View roles and grants"),
    ("role", "manage", "Create, edit, and delete roles"),
    ("report", "view", "View reports"),
    ("report", "export", "Export reports"),
];

const ADMIN_GRANTS: &[(&str, &str)] = &[
    ("document", "view"),
    ("document", "create"),
    ("document", "update"),
    ("document", "delete"),
    ("document", "approve"),
    ("meeting", "view"),
    ("meeting", "schedule"),
    ("meeting", "update"),
    ("meeting", "cancel"),
    ("meeting", "minutes"),
    ("audit", "view"),
    ("audit", "create"),
    ("audit", "update"),
    ("audit", "assign"),
    ("audit", "close"),
    ("notification", "view"),
    ("notification", "send"),
    ("department", "view"),
    ("department", "create"),
    ("department", "update"),
    ("department", "delete"),
    ("user", "view"),
    ("user", "create"),
    ("user", "update"),
    ("user", "deactivate"),
    ("role", "view"),
    ("role", "manage"),
    ("report", "view"),
    ("report", "export"),
];

const HOD_GRANTS: &[(&str, &str)] = &[
    ("document", "view"),
    ("document", "create"),
    ("document", "update"),
    ("document", "approve"),
    ("meeting", "view"),
    ("meeting", "schedule"),
    ("meeting", "update"),
    ("meeting", "minutes"),
    ("audit", "view"),
    ("audit", "update"),
    ("audit", "assign"),
    ("notification", "view"),
    ("notification", "send"),
    ("department", "view"),
    ("department", "update"),
    ("user", "view"),
    ("report", "view"),
    ("report", "export"),
];

const AUDITOR_GRANTS: &[(&str, &str)] = &[
    ("document", "view"),
    ("meeting", "view"),
    ("audit", "view"),
    ("audit", "create"),
    ("audit", "update"),
    ("audit", "assign"),
    ("audit", "close"),
    ("notification", "view"),
    ("report", "view"),
    ("report", "export"),
];

const COORDINATOR_GRANTS: &[(&str, &str)] = &[
    ("document", "view"),
    ("document", "create"),
    ("document", "update"),
    ("meeting", "view"),
    ("meeting", "schedule"),
    ("meeting", "update"),
    ("meeting", "cancel"),
    ("meeting", "minutes"),
    ("audit", "view"),
    ("audit", "create"),
    ("audit", "update"),
    ("notification", "view"),
    ("notification", "send"),
    ("report", "view"),
];

const STAFF_GRANTS: &[(&str, &str)] = &[
    ("document", "view"),
    ("document", "create"),
    ("meeting", "view"),
    ("audit", "view"),
    ("notification", "view"),
];

/// The static template table applied by the tenant seeder.
pub const ROLE_TEMPLATES: &[RoleTemplate] = &[
    RoleTemplate {
        name: "Admin",
        scope: RoleScope::Tenant,
        is_removable: false,
        grants: ADMIN_GRANTS,
    },
    RoleTemplate {
        name: HEADSHIP_ROLE,
        scope: RoleScope::Department,
        is_removable: false,
        grants: HOD_GRANTS,
    },
    RoleTemplate {
        name: "Auditor",
        scope: RoleScope::Tenant,
        is_removable: true,
        grants: AUDITOR_GRANTS,
    },
    RoleTemplate {
        name: "Coordinator",
        scope: RoleScope::Tenant,
        is_removable: true,
        grants: COORDINATOR_GRANTS,
    },
    RoleTemplate {
        name: BASELINE_ROLE,
        scope: RoleScope::Tenant,
        is_removable: false,
        grants: STAFF_GRANTS,
    },
];

/// Look up a template by name, case-insensitively.
pub fn find_template(name: &str) -> Option<&'static RoleTemplate> {
    ROLE_TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
}
