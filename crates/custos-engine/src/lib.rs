//! Custos Engine — tenant-scoped authorization services.
//!
//! The services in this crate are generic over the `custos-core`
//! repository traits so the engine has no dependency on the database
//! crate:
//!
//! - [`AccessResolver`] — effective-permission resolution, the single
//!   entry point every privileged operation calls.
//! - [`TenantGuard`] — cross-tenant reference validation.
//! - [`RoleService`] — role-permission matrix edits, template
//!   application, and tenant role seeding.
//! - [`OverrideService`] — per-user override administration.
//! - [`HandoverService`] — atomic department headship handover.

pub mod config;
pub mod guard;
pub mod handover;
pub mod overrides;
pub mod resolver;
pub mod roles;

pub use config::EngineConfig;
pub use guard::TenantGuard;
pub use handover::HandoverService;
pub use overrides::{OverrideRequest, OverrideService};
pub use resolver::AccessResolver;
pub use roles::{RoleService, SeedOutcome, SeedReport, SeedStatus};
