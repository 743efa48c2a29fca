//! Tests for the embedded database manager.

use custos_core::error::CustosError;
use custos_core::models::permission::CreatePermission;
use custos_core::models::role::{CreateRole, RoleScope};
use custos_core::models::tenant::CreateTenant;
use custos_core::repository::{
    AssignmentRepository, CatalogRepository, RoleRepository, TenantRepository,
};
use custos_db::DbManager;

#[tokio::test]
async fn embedded_manager_serves_migrated_repositories() {
    let manager = DbManager::embedded("test", "test").await.unwrap();

    let tenant = manager
        .tenants()
        .create(CreateTenant {
            name: "Test Institution".into(),
            domain: "test.example.edu".into(),
        })
        .await
        .unwrap();

    let perm = manager
        .catalog()
        .register(CreatePermission {
            module: "document".into(),
            action: "view".into(),
            description: "View documents".into(),
        })
        .await
        .unwrap();

    let role = manager
        .roles()
        .create(CreateRole {
            tenant_id: tenant.id,
            name: "Viewer".into(),
            is_default: false,
            is_removable: true,
            scope: RoleScope::Tenant,
        })
        .await
        .unwrap();
    manager
        .roles()
        .upsert_grant(role.id, perm.id, true)
        .await
        .unwrap();

    // Both repository handles see the same underlying database.
    let allowed = manager
        .roles()
        .any_role_allows(&[role.id], perm.id)
        .await
        .unwrap();
    assert!(allowed);

    let roles = manager
        .assignments()
        .roles_for_user(tenant.id, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(roles.is_empty());
}

#[tokio::test]
async fn embedded_manager_applied_the_schema() {
    let manager = DbManager::embedded("test", "test").await.unwrap();

    manager
        .tenants()
        .create(CreateTenant {
            name: "Institution".into(),
            domain: "same.example.edu".into(),
        })
        .await
        .unwrap();

    // The unique domain index only exists if migrations ran.
    let result = manager
        .tenants()
        .create(CreateTenant {
            name: "Impostor".into(),
            domain: "same.example.edu".into(),
        })
        .await;
    assert!(matches!(result, Err(CustosError::StoreUnavailable(_))));
}
