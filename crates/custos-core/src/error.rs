//! Error types for the custos authorization core.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CustosError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Capability already registered: {module}:{action}")]
    DuplicateCapability { module: String, action: String },

    #[error("Capability is referenced by at least one role grant: {id}")]
    CapabilityInUse { id: Uuid },

    #[error("Role is still assigned to at least one user: {id}")]
    RoleInUse { id: Uuid },

    /// A cross-tenant reference was detected. This is a data-integrity
    /// signal, distinct from an ordinary access denial, and must never
    /// be coerced into a plain deny.
    #[error("Cross-tenant reference rejected: {resource} {ids:?}")]
    IsolationViolation { resource: String, ids: Vec<Uuid> },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The underlying store could not answer. Callers must fail closed
    /// (treat the operation as denied), never default-allow.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CustosResult<T> = Result<T, CustosError>;
