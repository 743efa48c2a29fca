//! Engine configuration.

use custos_core::templates;

/// Configuration for the authorization services.
///
/// Role names here must match the seeded templates for handover to
/// find its privileged and baseline roles.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Sentinel role whose holders bypass permission resolution
    /// entirely. Checked by name comparison only, never by catalog
    /// lookup.
    pub bypass_role: String,
    /// Privileged role a department head holds for their department.
    pub headship_role: String,
    /// Baseline role an outgoing head is downgraded to.
    pub baseline_role: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bypass_role: templates::BYPASS_ROLE.into(),
            headship_role: templates::HEADSHIP_ROLE.into(),
            baseline_role: templates::BASELINE_ROLE.into(),
        }
    }
}
