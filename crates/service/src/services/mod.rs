//! Entity services: one per entity type, each holding the store handles it
//! needs. Handles are injected at construction.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::repository::{CityRepository, DepartmentRepository, RoleRepository, UserRepository};

pub mod city_service;
pub mod department_service;
pub mod role_service;
pub mod user_service;

pub use city_service::CityService;
pub use department_service::DepartmentService;
pub use role_service::RoleService;
pub use user_service::UserService;

/// The full service set, cheap to clone into request handlers.
#[derive(Clone)]
pub struct Services {
    pub departments: Arc<DepartmentService>,
    pub roles: Arc<RoleService>,
    pub cities: Arc<CityService>,
    pub users: Arc<UserService>,
}

impl Services {
    /// Wire every service against one store implementing all capabilities.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DepartmentRepository + RoleRepository + CityRepository + UserRepository + 'static,
    {
        let departments: Arc<dyn DepartmentRepository> = store.clone();
        let roles: Arc<dyn RoleRepository> = store.clone();
        let cities: Arc<dyn CityRepository> = store.clone();
        let users: Arc<dyn UserRepository> = store;
        Self {
            departments: Arc::new(DepartmentService::new(departments.clone())),
            roles: Arc::new(RoleService::new(roles.clone())),
            cities: Arc::new(CityService::new(cities.clone(), departments.clone(), users.clone())),
            users: Arc::new(UserService::new(users, cities, departments, roles)),
        }
    }
}

/// Blank or absent queries match everything; others are used verbatim.
pub(crate) fn search_term(query: Option<&str>) -> &str {
    match query {
        Some(q) if !q.trim().is_empty() => q,
        _ => "",
    }
}

/// Per-call memo of relation lookups used while projecting a page.
pub(crate) struct Lookup<T> {
    seen: HashMap<i32, Option<T>>,
}

impl<T: Clone> Lookup<T> {
    pub(crate) fn new() -> Self { Self { seen: HashMap::new() } }

    pub(crate) async fn get<F, Fut>(&mut self, id: i32, fetch: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(i32) -> Fut,
        Fut: Future<Output = Result<Option<T>, StoreError>>,
    {
        if let Some(hit) = self.seen.get(&id) {
            return Ok(hit.clone());
        }
        let found = fetch(id).await?;
        self.seen.insert(id, found.clone());
        Ok(found)
    }
}
