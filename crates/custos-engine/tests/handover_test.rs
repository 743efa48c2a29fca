//! Headship handover service tests over in-memory SurrealDB.

use custos_core::error::CustosError;
use custos_core::models::assignment::AssignDepartmentRole;
use custos_core::models::department::CreateDepartment;
use custos_core::models::tenant::CreateTenant;
use custos_core::models::user::CreateUser;
use custos_core::repository::{
    AssignmentRepository, DepartmentRepository, RoleRepository, TenantRepository, UserRepository,
};
use custos_db::repository::{
    SurrealAssignmentRepository, SurrealCatalogRepository, SurrealDepartmentRepository,
    SurrealRoleRepository, SurrealTenantLookupRepository, SurrealTenantRepository,
    SurrealUserRepository,
};
use custos_engine::{EngineConfig, HandoverService, RoleService, TenantGuard};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = Surreal<surrealdb::engine::local::Db>;
type Engine = surrealdb::engine::local::Db;

struct Fixture {
    db: Db,
    tenant_id: Uuid,
    department_id: Uuid,
    alice: Uuid,
    bob: Uuid,
    hod_role: Uuid,
    staff_role: Uuid,
}

/// Helper: seeded tenant with a department headed by alice.
async fn setup() -> Fixture {
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

    let seeder = RoleService::new(
        SurrealRoleRepository::new(db.clone()),
        SurrealCatalogRepository::new(db.clone()),
        TenantGuard::new(SurrealTenantLookupRepository::new(db.clone())),
    );
    seeder.seed_catalog().await.unwrap();
    seeder.seed_tenant(tenant.id).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let alice = users
        .create(CreateUser {
            tenant_id: tenant.id,
            username: "alice".into(),
            email: "alice@test.example.edu".into(),
        })
        .await
        .unwrap();
    let bob = users
        .create(CreateUser {
            tenant_id: tenant.id,
            username: "bob".into(),
            email: "bob@test.example.edu".into(),
        })
        .await
        .unwrap();

    let department = SurrealDepartmentRepository::new(db.clone())
        .create(CreateDepartment {
            tenant_id: tenant.id,
            name: "Quality Assurance".into(),
            hod_id: Some(alice.id),
        })
        .await
        .unwrap();

    let roles = SurrealRoleRepository::new(db.clone());
    let hod_role = roles.find_by_name(tenant.id, "HOD").await.unwrap();
    let staff_role = roles.find_by_name(tenant.id, "Staff").await.unwrap();

    SurrealAssignmentRepository::new(db.clone())
        .assign_department_role(AssignDepartmentRole {
            user_id: alice.id,
            department_id: department.id,
            role_id: hod_role.id,
            is_primary_department: true,
            is_primary_role: true,
        })
        .await
        .unwrap();

    Fixture {
        db,
        tenant_id: tenant.id,
        department_id: department.id,
        alice: alice.id,
        bob: bob.id,
        hod_role: hod_role.id,
        staff_role: staff_role.id,
    }
}

fn service(
    db: &Db,
) -> HandoverService<
    SurrealDepartmentRepository<Engine>,
    SurrealRoleRepository<Engine>,
    SurrealAssignmentRepository<Engine>,
    SurrealTenantLookupRepository<Engine>,
> {
    HandoverService::new(
        SurrealDepartmentRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealAssignmentRepository::new(db.clone()),
        TenantGuard::new(SurrealTenantLookupRepository::new(db.clone())),
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn handover_moves_headship_and_swaps_roles() {
    let fx = setup().await;
    let service = service(&fx.db);

    service
        .handover(fx.tenant_id, fx.department_id, fx.alice, fx.bob)
        .await
        .unwrap();

    let department = SurrealDepartmentRepository::new(fx.db.clone())
        .get_by_id(fx.tenant_id, fx.department_id)
        .await
        .unwrap();
    assert_eq!(department.hod_id, Some(fx.bob));

    let assignments = SurrealAssignmentRepository::new(fx.db.clone());
    let alice_dept = assignments.department_roles_for_user(fx.alice).await.unwrap();
    assert_eq!(alice_dept.len(), 1);
    assert_eq!(alice_dept[0].role_id, fx.staff_role);

    let bob_dept = assignments.department_roles_for_user(fx.bob).await.unwrap();
    assert_eq!(bob_dept.len(), 1);
    assert_eq!(bob_dept[0].role_id, fx.hod_role);
    assert!(bob_dept[0].is_primary_role);
}

#[tokio::test]
async fn handover_to_self_rejected() {
    let fx = setup().await;
    let service = service(&fx.db);

    let result = service
        .handover(fx.tenant_id, fx.department_id, fx.alice, fx.alice)
        .await;
    assert!(matches!(result, Err(CustosError::Validation { .. })));
}

#[tokio::test]
async fn handover_from_non_head_rejected() {
    let fx = setup().await;
    let service = service(&fx.db);

    // Bob is not the current head.
    let result = service
        .handover(fx.tenant_id, fx.department_id, fx.bob, fx.alice)
        .await;
    assert!(matches!(result, Err(CustosError::Validation { .. })));

    // Nothing changed.
    let department = SurrealDepartmentRepository::new(fx.db.clone())
        .get_by_id(fx.tenant_id, fx.department_id)
        .await
        .unwrap();
    assert_eq!(department.hod_id, Some(fx.alice));
}

#[tokio::test]
async fn handover_to_foreign_user_rejected() {
    let fx = setup().await;
    let service = service(&fx.db);

    let other_tenant = SurrealTenantRepository::new(fx.db.clone())
        .create(CreateTenant {
            name: "Other Institution".into(),
            domain: "other.example.edu".into(),
        })
        .await
        .unwrap();
    let mallory = SurrealUserRepository::new(fx.db.clone())
        .create(CreateUser {
            tenant_id: other_tenant.id,
            username: "mallory".into(),
            email: "mallory@other.example.edu".into(),
        })
        .await
        .unwrap();

    let result = service
        .handover(fx.tenant_id, fx.department_id, fx.alice, mallory.id)
        .await;

    match result {
        Err(CustosError::IsolationViolation { resource, ids }) => {
            assert_eq!(resource, "user");
            assert_eq!(ids, vec![mallory.id]);
        }
        other => panic!("expected isolation violation, got {other:?}"),
    }

    // The headship did not move.
    let department = SurrealDepartmentRepository::new(fx.db.clone())
        .get_by_id(fx.tenant_id, fx.department_id)
        .await
        .unwrap();
    assert_eq!(department.hod_id, Some(fx.alice));
}

#[tokio::test]
async fn handover_on_unknown_department_rejected() {
    let fx = setup().await;
    let service = service(&fx.db);

    let result = service
        .handover(fx.tenant_id, Uuid::new_v4(), fx.alice, fx.bob)
        .await;
    assert!(matches!(
        result,
        Err(CustosError::IsolationViolation { .. })
    ));
}

#[tokio::test]
async fn repeated_handover_round_trips() {
    let fx = setup().await;
    let service = service(&fx.db);

    service
        .handover(fx.tenant_id, fx.department_id, fx.alice, fx.bob)
        .await
        .unwrap();
    service
        .handover(fx.tenant_id, fx.department_id, fx.bob, fx.alice)
        .await
        .unwrap();

    let department = SurrealDepartmentRepository::new(fx.db.clone())
        .get_by_id(fx.tenant_id, fx.department_id)
        .await
        .unwrap();
    assert_eq!(department.hod_id, Some(fx.alice));

    let assignments = SurrealAssignmentRepository::new(fx.db.clone());
    let alice_dept = assignments.department_roles_for_user(fx.alice).await.unwrap();
    assert_eq!(alice_dept.len(), 1);
    assert_eq!(alice_dept[0].role_id, fx.hod_role);

    let bob_dept = assignments.department_roles_for_user(fx.bob).await.unwrap();
    assert_eq!(bob_dept.len(), 1);
    assert_eq!(bob_dept[0].role_id, fx.staff_role);
}
