//! Integration tests for the role-permission matrix using in-memory
//! SurrealDB.

use custos_core::error::CustosError;
use custos_core::models::permission::CreatePermission;
use custos_core::models::role::{CreateRole, RoleScope};
use custos_core::models::tenant::CreateTenant;
use custos_core::repository::{CatalogRepository, RoleRepository, TenantRepository};
use custos_db::repository::{
    SurrealCatalogRepository, SurrealRoleRepository, SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: in-memory DB with a tenant and three catalog entries.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid,      // tenant_id
    Vec<Uuid>, // permission ids: view, upload, approve
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    custos_db::run_migrations(&db).await.unwrap();

    let tenant = SurrealTenantRepository::new(db.clone())
        .create(CreateTenant {
            name: "Test Institution".into(),
            domain: "test.example.edu".into(),
        })
        .await
        .unwrap();

    let catalog = SurrealCatalogRepository::new(db.clone());
    let mut permission_ids = Vec::new();
    for action in ["view", "upload", "approve"] {
        let perm = catalog
            .register(CreatePermission {
                module: "document".into(),
                action: action.into(),
                description: format!("document {action}"),
            })
            .await
            .unwrap();
        permission_ids.push(perm.id);
    }

    (db, tenant.id, permission_ids)
}

async fn make_role(db: &Surreal<surrealdb::engine::local::Db>, tenant_id: Uuid, name: &str) -> Uuid {
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            tenant_id,
            name: name.into(),
            is_default: false,
            is_removable: true,
            scope: RoleScope::Tenant,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn set_and_get_role_permissions() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let role_id = make_role(&db, tenant_id, "Editor").await;

    repo.set_role_permissions(role_id, vec![perms[0], perms[1]])
        .await
        .unwrap();

    let grants = repo.get_role_permissions(role_id).await.unwrap();
    assert_eq!(grants.len(), 2);
    assert!(grants.iter().all(|g| g.allowed));

    let actions: Vec<&str> = grants
        .iter()
        .map(|g| g.permission.action.as_str())
        .collect();
    assert!(actions.contains(&"view"));
    assert!(actions.contains(&"upload"));
}

#[tokio::test]
async fn set_replaces_previous_grants() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let role_id = make_role(&db, tenant_id, "Editor").await;

    repo.set_role_permissions(role_id, vec![perms[0], perms[1]])
        .await
        .unwrap();
    repo.set_role_permissions(role_id, vec![perms[2]])
        .await
        .unwrap();

    // Only the second set survives.
    let grants = repo.get_role_permissions(role_id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].permission.action, "approve");
}

#[tokio::test]
async fn set_with_duplicate_ids_collapses() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let role_id = make_role(&db, tenant_id, "Editor").await;

    repo.set_role_permissions(role_id, vec![perms[0], perms[0], perms[1]])
        .await
        .unwrap();

    let grants = repo.get_role_permissions(role_id).await.unwrap();
    assert_eq!(grants.len(), 2);
}

#[tokio::test]
async fn set_empty_clears_all_grants() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let role_id = make_role(&db, tenant_id, "Editor").await;

    repo.set_role_permissions(role_id, perms).await.unwrap();
    repo.set_role_permissions(role_id, vec![]).await.unwrap();

    let grants = repo.get_role_permissions(role_id).await.unwrap();
    assert!(grants.is_empty());
}

#[tokio::test]
async fn upsert_grant_flips_allowed_in_place() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let role_id = make_role(&db, tenant_id, "Editor").await;

    repo.upsert_grant(role_id, perms[0], true).await.unwrap();
    repo.upsert_grant(role_id, perms[0], false).await.unwrap();

    // One row, now a suppression.
    let grants = repo.get_role_permissions(role_id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert!(!grants[0].allowed);
}

#[tokio::test]
async fn any_role_allows_unions_across_roles() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let granting = make_role(&db, tenant_id, "Editor").await;
    let suppressing = make_role(&db, tenant_id, "Reviewer").await;

    repo.upsert_grant(granting, perms[0], true).await.unwrap();
    repo.upsert_grant(suppressing, perms[0], false)
        .await
        .unwrap();

    // A suppression in one role does not veto another role's grant.
    let allowed = repo
        .any_role_allows(&[granting, suppressing], perms[0])
        .await
        .unwrap();
    assert!(allowed);

    // The suppressing role alone does not grant.
    let allowed = repo
        .any_role_allows(&[suppressing], perms[0])
        .await
        .unwrap();
    assert!(!allowed);
}

#[tokio::test]
async fn any_role_allows_empty_role_set_is_false() {
    let (db, _, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let allowed = repo.any_role_allows(&[], perms[0]).await.unwrap();
    assert!(!allowed);
}

#[tokio::test]
async fn find_role_by_name_is_case_insensitive() {
    let (db, tenant_id, _) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    make_role(&db, tenant_id, "Auditor").await;

    let found = repo.find_by_name(tenant_id, "auditor").await.unwrap();
    assert_eq!(found.name, "Auditor");

    let found = repo.find_by_name(tenant_id, "AUDITOR").await.unwrap();
    assert_eq!(found.name, "Auditor");
}

#[tokio::test]
async fn duplicate_role_name_rejected_case_insensitively() {
    let (db, tenant_id, _) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    make_role(&db, tenant_id, "Auditor").await;

    let result = repo
        .create(CreateRole {
            tenant_id,
            name: "auditor".into(),
            is_default: false,
            is_removable: true,
            scope: RoleScope::Tenant,
        })
        .await;

    // The uniqueness rejection surfaces as a store failure describing
    // the failed statement, not as a migration problem.
    match result {
        Err(CustosError::StoreUnavailable(message)) => {
            assert!(
                message.starts_with("Query failed"),
                "unexpected error text: {message}"
            );
        }
        other => panic!("expected store failure, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_role_removes_its_grants() {
    let (db, tenant_id, perms) = setup().await;
    let repo = SurrealRoleRepository::new(db.clone());
    let role_id = make_role(&db, tenant_id, "Ephemeral").await;

    repo.set_role_permissions(role_id, vec![perms[0]])
        .await
        .unwrap();
    repo.delete(tenant_id, role_id).await.unwrap();

    let result = repo.get_by_id(tenant_id, role_id).await;
    assert!(matches!(result, Err(CustosError::NotFound { .. })));

    // The grant went with it, so the capability is deletable again.
    let catalog = SurrealCatalogRepository::new(db);
    catalog.delete(perms[0]).await.unwrap();
}

#[tokio::test]
async fn delete_non_removable_role_rejected() {
    let (db, tenant_id, _) = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let role = repo
        .create(CreateRole {
            tenant_id,
            name: "Admin".into(),
            is_default: true,
            is_removable: false,
            scope: RoleScope::Tenant,
        })
        .await
        .unwrap();

    let result = repo.delete(tenant_id, role.id).await;
    assert!(matches!(result, Err(CustosError::Validation { .. })));
}
