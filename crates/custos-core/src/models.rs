//! Domain models for the custos authorization core.
//!
//! These are the core types shared across all crates.

pub mod actor;
pub mod assignment;
pub mod decision;
pub mod department;
pub mod grant;
pub mod permission;
pub mod role;
pub mod tenant;
pub mod user;
pub mod user_permission;
