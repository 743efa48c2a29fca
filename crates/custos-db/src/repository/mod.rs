//! SurrealDB repository implementations.

mod assignment;
mod catalog;
mod department;
mod lookup;
mod role;
mod tenant;
mod user;
mod user_permission;

pub use assignment::SurrealAssignmentRepository;
pub use catalog::SurrealCatalogRepository;
pub use department::SurrealDepartmentRepository;
pub use lookup::SurrealTenantLookupRepository;
pub use role::SurrealRoleRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
pub use user_permission::SurrealOverrideRepository;
