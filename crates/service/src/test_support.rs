#![cfg(test)]
use std::sync::Arc;

use chrono::NaiveDate;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::domain::{
    City, CreateUserInput, Department, NewCity, NewDepartment, NewRole, NewUser, Role, User,
};
use crate::repository::memory::MemoryStore;
use crate::repository::{CityRepository, DepartmentRepository, RoleRepository, UserRepository};
use crate::services::Services;

// Migrations run once per test process.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

fn db_config() -> configs::DatabaseConfig {
    let mut cfg = configs::DatabaseConfig::default();
    cfg.normalize_from_env();
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    MIGRATED
        .get_or_init(|| async {
            let db = connect_with_config(&db_config()).await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
        })
        .await;

    let db = connect_with_config(&db_config()).await?;
    Ok(db)
}

/// Two departments, one city in each, two roles and one user.
pub struct Seed {
    pub store: Arc<MemoryStore>,
    pub lima: Department,
    pub cusco: Department,
    pub miraflores: City,
    pub wanchaq: City,
    pub admin: Role,
    pub courier: Role,
    pub juan: User,
}

pub async fn seeded() -> (Services, Seed) {
    let store = Arc::new(MemoryStore::new());
    let s = store.as_ref();
    let lima = DepartmentRepository::insert(s, NewDepartment { name: "Lima".into() }).await.unwrap();
    let cusco = DepartmentRepository::insert(s, NewDepartment { name: "Cusco".into() }).await.unwrap();
    let admin = RoleRepository::insert(s, NewRole { name: "Admin".into() }).await.unwrap();
    let courier = RoleRepository::insert(s, NewRole { name: "Courier".into() }).await.unwrap();
    let miraflores = CityRepository::insert(s, NewCity { name: "Miraflores".into(), department_id: lima.id })
        .await
        .unwrap();
    let wanchaq = CityRepository::insert(s, NewCity { name: "Wanchaq".into(), department_id: cusco.id })
        .await
        .unwrap();
    let juan = UserRepository::insert(
        s,
        NewUser {
            name: "Juan Perez".into(),
            email: "juan@example.com".into(),
            phone: Some("987654321".into()),
            registered_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            address_detail: Some("Av. Larco 123".into()),
            city_id: miraflores.id,
            department_id: lima.id,
            role_id: admin.id,
        },
    )
    .await
    .unwrap();

    let services = Services::from_store(store.clone());
    (services, Seed { store, lima, cusco, miraflores, wanchaq, admin, courier, juan })
}

/// Valid courier signup in Miraflores, Lima.
pub fn maria(seed: &Seed) -> CreateUserInput {
    CreateUserInput {
        name: "Maria Lopez".into(),
        email: "maria@example.com".into(),
        phone: None,
        registered_on: None,
        address_detail: None,
        city_id: seed.miraflores.id,
        department_id: seed.lima.id,
        role_id: seed.courier.id,
    }
}
