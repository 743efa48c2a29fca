//! Catalog and tenant role seeding tests over in-memory SurrealDB.

use custos_core::models::tenant::CreateTenant;
use custos_core::repository::{CatalogRepository, Pagination, RoleRepository, TenantRepository};
use custos_core::templates;
use custos_db::repository::{
    SurrealCatalogRepository, SurrealRoleRepository, SurrealTenantLookupRepository,
    SurrealTenantRepository,
};
use custos_engine::{RoleService, SeedStatus, TenantGuard};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = Surreal<surrealdb::engine::local::Db>;
type Engine = surrealdb::engine::local::Db;

async fn setup() -> (Db, Uuid) {
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

    (db, tenant.id)
}

fn service(
    db: &Db,
) -> RoleService<
    SurrealRoleRepository<Engine>,
    SurrealCatalogRepository<Engine>,
    SurrealTenantLookupRepository<Engine>,
> {
    RoleService::new(
        SurrealRoleRepository::new(db.clone()),
        SurrealCatalogRepository::new(db.clone()),
        TenantGuard::new(SurrealTenantLookupRepository::new(db.clone())),
    )
}

#[tokio::test]
async fn seed_catalog_registers_defaults_once() {
    let (db, _) = setup().await;
    let service = service(&db);

    let first = service.seed_catalog().await.unwrap();
    assert_eq!(first, templates::DEFAULT_CAPABILITIES.len());

    // Re-running registers nothing new.
    let second = service.seed_catalog().await.unwrap();
    assert_eq!(second, 0);

    let catalog = SurrealCatalogRepository::new(db);
    let all = catalog.list().await.unwrap();
    assert_eq!(all.len(), templates::DEFAULT_CAPABILITIES.len());
}

#[tokio::test]
async fn seed_tenant_creates_every_template_role() {
    let (db, tenant_id) = setup().await;
    let service = service(&db);
    service.seed_catalog().await.unwrap();

    let report = service.seed_tenant(tenant_id).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.outcomes.len(), templates::ROLE_TEMPLATES.len());

    for (outcome, template) in report.outcomes.iter().zip(templates::ROLE_TEMPLATES) {
        assert_eq!(outcome.role, template.name);
        assert_eq!(
            outcome.status,
            SeedStatus::Created {
                granted: template.grants.len()
            },
            "unexpected outcome for {}",
            template.name
        );
    }

    let roles = SurrealRoleRepository::new(db);
    for template in templates::ROLE_TEMPLATES {
        let role = roles.find_by_name(tenant_id, template.name).await.unwrap();
        assert!(role.is_default);
        assert_eq!(role.is_removable, template.is_removable);
        assert_eq!(role.scope, template.scope);

        let grants = roles.get_role_permissions(role.id).await.unwrap();
        assert_eq!(grants.len(), template.grants.len());
    }
}

#[tokio::test]
async fn reseeding_is_idempotent() {
    let (db, tenant_id) = setup().await;
    let service = service(&db);
    service.seed_catalog().await.unwrap();
    service.seed_tenant(tenant_id).await.unwrap();

    let report = service.seed_tenant(tenant_id).await.unwrap();
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.status == SeedStatus::AlreadyExists)
    );

    // Still exactly one role per template.
    let roles = SurrealRoleRepository::new(db);
    let page = roles
        .list(
            tenant_id,
            Pagination {
                offset: 0,
                limit: 50,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, templates::ROLE_TEMPLATES.len() as u64);
}

#[tokio::test]
async fn case_variant_existing_role_is_left_alone() {
    let (db, tenant_id) = setup().await;
    let service = service(&db);
    service.seed_catalog().await.unwrap();

    // An operator hand-created "admin" before seeding ran.
    let roles = SurrealRoleRepository::new(db.clone());
    roles
        .create(custos_core::models::role::CreateRole {
            tenant_id,
            name: "admin".into(),
            is_default: false,
            is_removable: true,
            scope: custos_core::models::role::RoleScope::Tenant,
        })
        .await
        .unwrap();

    let report = service.seed_tenant(tenant_id).await.unwrap();
    let admin = report
        .outcomes
        .iter()
        .find(|o| o.role == "Admin")
        .expect("Admin outcome present");
    assert_eq!(admin.status, SeedStatus::AlreadyExists);

    // The pre-existing role was not converted to a system role.
    let existing = roles.find_by_name(tenant_id, "Admin").await.unwrap();
    assert_eq!(existing.name, "admin");
    assert!(existing.is_removable);
}

#[tokio::test]
async fn seeding_with_partial_catalog_skips_missing_grants() {
    let (db, tenant_id) = setup().await;
    let service = service(&db);
    // Catalog deliberately not seeded: every template pair is missing.

    let report = service.seed_tenant(tenant_id).await.unwrap();
    assert!(report.is_complete());
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.status == SeedStatus::Created { granted: 0 })
    );
}

#[tokio::test]
async fn seeding_two_tenants_keeps_matrices_separate() {
    let (db, tenant_a) = setup().await;
    let tenant_b = SurrealTenantRepository::new(db.clone())
        .create(CreateTenant {
            name: "Other Institution".into(),
            domain: "other.example.edu".into(),
        })
        .await
        .unwrap()
        .id;

    let service = service(&db);
    service.seed_catalog().await.unwrap();
    service.seed_tenant(tenant_a).await.unwrap();
    service.seed_tenant(tenant_b).await.unwrap();

    let roles = SurrealRoleRepository::new(db);
    let a_staff = roles.find_by_name(tenant_a, "Staff").await.unwrap();
    let b_staff = roles.find_by_name(tenant_b, "Staff").await.unwrap();
    assert_ne!(a_staff.id, b_staff.id);
    assert_eq!(a_staff.tenant_id, tenant_a);
    assert_eq!(b_staff.tenant_id, tenant_b);
}

#[tokio::test]
async fn apply_template_to_custom_role() {
    let (db, tenant_id) = setup().await;
    let service = service(&db);
    service.seed_catalog().await.unwrap();

    let roles = SurrealRoleRepository::new(db);
    let role = roles
        .create(custos_core::models::role::CreateRole {
            tenant_id,
            name: "Guest Auditor".into(),
            is_default: false,
            is_removable: true,
            scope: custos_core::models::role::RoleScope::Tenant,
        })
        .await
        .unwrap();

    let granted = service
        .apply_template(tenant_id, role.id, "auditor")
        .await
        .unwrap();

    let auditor_template = templates::find_template("Auditor").unwrap();
    assert_eq!(granted, auditor_template.grants.len());

    let grants = roles.get_role_permissions(role.id).await.unwrap();
    assert_eq!(grants.len(), granted);
}

#[tokio::test]
async fn apply_unknown_template_rejected() {
    let (db, tenant_id) = setup().await;
    let service = service(&db);

    let roles = SurrealRoleRepository::new(db);
    let role = roles
        .create(custos_core::models::role::CreateRole {
            tenant_id,
            name: "Misc".into(),
            is_default: false,
            is_removable: true,
            scope: custos_core::models::role::RoleScope::Tenant,
        })
        .await
        .unwrap();

    let result = service.apply_template(tenant_id, role.id, "Wizard").await;
    assert!(matches!(
        result,
        Err(custos_core::error::CustosError::Validation { .. })
    ));
}
