//! SurrealDB connection management.
//!
//! [`DbManager`] owns a connected, migrated database handle and hands
//! out repository instances bound to it. Construction always runs
//! pending migrations, so a manager in hand means the schema is
//! current.

use surrealdb::engine::local::{Db, Mem};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealAssignmentRepository, SurrealCatalogRepository, SurrealDepartmentRepository,
    SurrealOverrideRepository, SurrealRoleRepository, SurrealTenantLookupRepository,
    SurrealTenantRepository, SurrealUserRepository,
};
use crate::schema::run_migrations;

/// Configuration for connecting to a SurrealDB server.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "custos".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A connected and migrated database handle.
#[derive(Clone)]
pub struct DbManager<C: Connection> {
    db: Surreal<C>,
}

impl DbManager<Client> {
    /// Connect to a SurrealDB server, select the configured namespace
    /// and database, and apply any pending migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        run_migrations(&db).await?;

        info!("Connected to SurrealDB, schema current");

        Ok(Self { db })
    }
}

impl DbManager<Db> {
    /// Start an embedded in-memory instance, migrated and ready.
    ///
    /// Nothing persists beyond the handle's lifetime; this backs tests
    /// and single-process evaluation setups.
    pub async fn embedded(namespace: &str, database: &str) -> Result<Self, DbError> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns(namespace).use_db(database).await?;

        run_migrations(&db).await?;

        Ok(Self { db })
    }
}

impl<C: Connection> DbManager<C> {
    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }

    pub fn tenants(&self) -> SurrealTenantRepository<C> {
        SurrealTenantRepository::new(self.db.clone())
    }

    pub fn users(&self) -> SurrealUserRepository<C> {
        SurrealUserRepository::new(self.db.clone())
    }

    pub fn departments(&self) -> SurrealDepartmentRepository<C> {
        SurrealDepartmentRepository::new(self.db.clone())
    }

    pub fn catalog(&self) -> SurrealCatalogRepository<C> {
        SurrealCatalogRepository::new(self.db.clone())
    }

    pub fn roles(&self) -> SurrealRoleRepository<C> {
        SurrealRoleRepository::new(self.db.clone())
    }

    pub fn assignments(&self) -> SurrealAssignmentRepository<C> {
        SurrealAssignmentRepository::new(self.db.clone())
    }

    pub fn overrides(&self) -> SurrealOverrideRepository<C> {
        SurrealOverrideRepository::new(self.db.clone())
    }

    pub fn lookup(&self) -> SurrealTenantLookupRepository<C> {
        SurrealTenantLookupRepository::new(self.db.clone())
    }
}
