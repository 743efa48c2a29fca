//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter so that every query is scoped at
//! the predicate level — call sites never fetch first and compare
//! tenants afterwards.

use uuid::Uuid;

use crate::error::CustosResult;
use crate::models::{
    assignment::{AssignDepartmentRole, UserDepartmentRole},
    department::{CreateDepartment, Department, UpdateDepartment},
    grant::RoleGrant,
    permission::{CreatePermission, Permission},
    role::{CreateRole, Role},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
    user_permission::{OverrideWrite, UserPermission},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// The kinds of tenant-scoped resources a request may reference.
///
/// The permission catalog is deliberately absent: it is global, so a
/// catalog reference can never cross a tenant boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Role,
    Department,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Role => "role",
            ResourceKind::Department => "department",
        }
    }
}

/// A typed foreign reference carried by an incoming operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: Uuid,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

// ---------------------------------------------------------------------------
// Tenants (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = CustosResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CustosResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = CustosResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = CustosResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Permission catalog (global scope)
// ---------------------------------------------------------------------------

pub trait CatalogRepository: Send + Sync {
    /// Register a new capability. Fails with `DuplicateCapability` if
    /// `(module, action)` is already present.
    fn register(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = CustosResult<Permission>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CustosResult<Permission>> + Send;

    /// Point lookup by `(module, action)`. `NotFound` when absent —
    /// the resolver maps that to a deny, never an exception.
    fn find(
        &self,
        module: &str,
        action: &str,
    ) -> impl Future<Output = CustosResult<Permission>> + Send;

    /// All entries, ordered by module then action.
    fn list(&self) -> impl Future<Output = CustosResult<Vec<Permission>>> + Send;

    /// Delete an unreferenced entry. Fails with `CapabilityInUse` if
    /// any role grant references it.
    fn delete(&self, id: Uuid) -> impl Future<Output = CustosResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CustosResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CustosResult<User>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CustosResult<User>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CustosResult<PaginatedResult<User>>> + Send;
}

pub trait DepartmentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDepartment,
    ) -> impl Future<Output = CustosResult<Department>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CustosResult<Department>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDepartment,
    ) -> impl Future<Output = CustosResult<Department>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CustosResult<PaginatedResult<Department>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = CustosResult<Role>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CustosResult<Role>> + Send;

    /// Case-insensitive name lookup within a tenant.
    fn find_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> impl Future<Output = CustosResult<Role>> + Send;

    /// Delete a role. Fails with `RoleInUse` while any user holds it
    /// and with `Validation` for non-removable system roles.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CustosResult<()>> + Send;

    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CustosResult<PaginatedResult<Role>>> + Send;

    /// Replace the role's entire grant set atomically. Failure leaves
    /// the previous set intact, never a mixed state.
    fn set_role_permissions(
        &self,
        role_id: Uuid,
        permission_ids: Vec<Uuid>,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    /// Upsert a single grant or per-role suppression.
    fn upsert_grant(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
        allowed: bool,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    /// The role's grants joined with catalog descriptions.
    fn get_role_permissions(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = CustosResult<Vec<RoleGrant>>> + Send;

    /// Whether any role in the set carries an `allowed = true` grant
    /// for the capability. Grants are unioned across roles.
    fn any_role_allows(
        &self,
        role_ids: &[Uuid],
        permission_id: Uuid,
    ) -> impl Future<Output = CustosResult<bool>> + Send;
}

pub trait AssignmentRepository: Send + Sync {
    /// Upsert a tenant-wide role assignment.
    fn assign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        is_default: bool,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    fn unassign_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    /// Upsert a department-scoped role assignment.
    fn assign_department_role(
        &self,
        input: AssignDepartmentRole,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    fn unassign_department_role(
        &self,
        user_id: Uuid,
        department_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    /// All roles the user holds — tenant-wide and department-scoped,
    /// unioned and deduplicated, filtered to the given tenant.
    fn roles_for_user(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = CustosResult<Vec<Role>>> + Send;

    /// The user's department-scoped assignments.
    fn department_roles_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = CustosResult<Vec<UserDepartmentRole>>> + Send;

    /// Atomically reassign a department's headship: move `hod_id` to
    /// the incoming user, downgrade the outgoing user's privileged
    /// assignment for that department to the baseline role, and
    /// upgrade the incoming user. All writes commit or none do.
    fn handover_headship(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
        outgoing: Uuid,
        incoming: Uuid,
        privileged_role_id: Uuid,
        baseline_role_id: Uuid,
    ) -> impl Future<Output = CustosResult<()>> + Send;
}

pub trait OverrideRepository: Send + Sync {
    /// Upsert the single override row for `(user_id, permission_id)`.
    fn upsert(
        &self,
        input: OverrideWrite,
    ) -> impl Future<Output = CustosResult<UserPermission>> + Send;

    /// Delete the override row entirely, reverting to role-based
    /// resolution.
    fn remove(
        &self,
        user_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = CustosResult<()>> + Send;

    /// The current row regardless of expiry — the audit/history view.
    fn get(
        &self,
        user_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = CustosResult<UserPermission>> + Send;

    /// The current row only if still active (`expires_at` null or in
    /// the future). `NotFound` for absent or expired rows.
    fn get_active(
        &self,
        user_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = CustosResult<UserPermission>> + Send;

    /// All override rows for a user, active or not.
    fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = CustosResult<Vec<UserPermission>>> + Send;
}

/// Tenant-scoped existence checks backing the isolation guard.
pub trait TenantLookupRepository: Send + Sync {
    /// Returns the subset of `ids` that exist in `tenant_id` for the
    /// given resource kind. The query itself is scoped by tenant so a
    /// foreign record's existence is never observable.
    fn filter_in_tenant(
        &self,
        kind: ResourceKind,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> impl Future<Output = CustosResult<Vec<Uuid>>> + Send;
}
