//! Authorization decision type.

use serde::{Deserialize, Serialize};

/// The outcome of effective-permission resolution.
///
/// Absence of anything — catalog entry, role, grant — resolves to
/// `Deny`; only store failures surface as errors, and callers treat
/// those identically to `Deny` (fail closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}
