//! Custos Core — domain models, error taxonomy, and repository traits
//! for the tenant-scoped authorization core.
//!
//! This crate is I/O-free. Database-backed implementations of the
//! repository traits live in `custos-db`; the authorization services
//! that compose them live in `custos-engine`.

pub mod error;
pub mod models;
pub mod repository;
pub mod templates;

pub use error::{CustosError, CustosResult};
