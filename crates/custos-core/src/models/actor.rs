//! Authenticated actor identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity attached to an inbound privileged operation.
///
/// Produced by the (out-of-scope) authentication layer; the core trusts
/// that `user_id` has been verified and that `tenant_id` is the tenant
/// the user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}
