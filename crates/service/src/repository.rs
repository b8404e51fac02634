//! Entity store capabilities consumed by the services.
//!
//! Each entity type gets keyed lookup, existence checks, case-insensitive
//! duplicate probes, paged queries ordered by name, and single-row writes.

use async_trait::async_trait;
use common::pagination::{Page, Pagination};

use crate::domain::{City, Department, NewCity, NewDepartment, NewRole, NewUser, Role, User, UserParent};
use crate::errors::StoreError;

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, StoreError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError>;
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, StoreError>;
    /// Case-insensitive substring match on name; empty query matches all.
    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<Department>, StoreError>;
    async fn insert(&self, department: NewDepartment) -> Result<Department, StoreError>;
    async fn update(&self, department: &Department) -> Result<Department, StoreError>;
    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, StoreError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError>;
    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, StoreError>;
    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<Role>, StoreError>;
    async fn insert(&self, role: NewRole) -> Result<Role, StoreError>;
    async fn update(&self, role: &Role) -> Result<Role, StoreError>;
    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<City>, StoreError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError>;
    /// Duplicate probe scoped to one department.
    async fn exists_by_name_in_department_ignore_case(&self, name: &str, department_id: i32) -> Result<bool, StoreError>;
    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<City>, StoreError>;
    async fn find_page_by_department(&self, department_id: i32, page: Pagination) -> Result<Page<City>, StoreError>;
    async fn insert(&self, city: NewCity) -> Result<City, StoreError>;
    async fn update(&self, city: &City) -> Result<City, StoreError>;
    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError>;
    async fn exists_by_email_ignore_case(&self, email: &str) -> Result<bool, StoreError>;
    async fn exists_by_parent(&self, parent: UserParent) -> Result<bool, StoreError>;
    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<User>, StoreError>;
    async fn find_page_by_parent(&self, parent: UserParent, page: Pagination) -> Result<Page<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn update(&self, user: &User) -> Result<User, StoreError>;
    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;
}

/// In-process store for tests, demos and doc examples.
///
/// Emulates the database's unique indexes and `ON DELETE RESTRICT`
/// foreign keys so integrity failures surface the same way.
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct Tables {
        departments: BTreeMap<i32, Department>,
        roles: BTreeMap<i32, Role>,
        cities: BTreeMap<i32, City>,
        users: BTreeMap<i32, User>,
        seq: i32,
    }

    impl Tables {
        fn next_id(&mut self) -> i32 {
            self.seq += 1;
            self.seq
        }

        fn user_references(&self, parent: UserParent) -> bool {
            self.users.values().any(|u| match parent {
                UserParent::City(id) => u.city_id == id,
                UserParent::Department(id) => u.department_id == id,
                UserParent::Role(id) => u.role_id == id,
            })
        }

        fn check_user_refs(&self, city_id: i32, department_id: i32, role_id: i32) -> Result<(), StoreError> {
            if !self.cities.contains_key(&city_id) {
                return Err(StoreError::ForeignKey("fk_user_city".into()));
            }
            if !self.departments.contains_key(&department_id) {
                return Err(StoreError::ForeignKey("fk_user_department".into()));
            }
            if !self.roles.contains_key(&role_id) {
                return Err(StoreError::ForeignKey("fk_user_role".into()));
            }
            Ok(())
        }

        fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
            self.users.values().any(|u| Some(u.id) != except && eq_ignore_case(&u.email, email))
        }
    }

    #[derive(Default)]
    pub struct MemoryStore {
        tables: RwLock<Tables>,
    }

    impl MemoryStore {
        pub fn new() -> Self { Self::default() }
    }

    fn eq_ignore_case(a: &str, b: &str) -> bool {
        a.to_lowercase() == b.to_lowercase()
    }

    fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Order by lowercased name then id, then cut out the requested page.
    fn paged<T>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> (String, i32), page: Pagination) -> Page<T> {
        let mut rows: Vec<T> = rows.collect();
        rows.sort_by_cached_key(|r| {
            let (name, id) = key(r);
            (name.to_lowercase(), id)
        });
        Page::from_rows(rows, page)
    }

    #[async_trait]
    impl DepartmentRepository for MemoryStore {
        async fn find_by_id(&self, id: i32) -> Result<Option<Department>, StoreError> {
            Ok(self.tables.read().await.departments.get(&id).cloned())
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.departments.contains_key(&id))
        }

        async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.departments.values().any(|d| eq_ignore_case(&d.name, name)))
        }

        async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<Department>, StoreError> {
            let t = self.tables.read().await;
            let rows = t.departments.values().filter(|d| contains_ignore_case(&d.name, query)).cloned();
            Ok(paged(rows, |d| (d.name.clone(), d.id), page))
        }

        async fn insert(&self, department: NewDepartment) -> Result<Department, StoreError> {
            let mut t = self.tables.write().await;
            if t.departments.values().any(|d| eq_ignore_case(&d.name, &department.name)) {
                return Err(StoreError::Unique("uniq_department_name_ci".into()));
            }
            let id = t.next_id();
            let row = Department { id, name: department.name };
            t.departments.insert(id, row.clone());
            Ok(row)
        }

        async fn update(&self, department: &Department) -> Result<Department, StoreError> {
            let mut t = self.tables.write().await;
            if t.departments.values().any(|d| d.id != department.id && eq_ignore_case(&d.name, &department.name)) {
                return Err(StoreError::Unique("uniq_department_name_ci".into()));
            }
            let slot = t
                .departments
                .get_mut(&department.id)
                .ok_or_else(|| StoreError::Db(format!("department {} vanished", department.id)))?;
            *slot = department.clone();
            Ok(department.clone())
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
            let mut t = self.tables.write().await;
            if t.cities.values().any(|c| c.department_id == id) {
                return Err(StoreError::ForeignKey("fk_city_department".into()));
            }
            if t.user_references(UserParent::Department(id)) {
                return Err(StoreError::ForeignKey("fk_user_department".into()));
            }
            t.departments.remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl RoleRepository for MemoryStore {
        async fn find_by_id(&self, id: i32) -> Result<Option<Role>, StoreError> {
            Ok(self.tables.read().await.roles.get(&id).cloned())
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.roles.contains_key(&id))
        }

        async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.roles.values().any(|r| eq_ignore_case(&r.name, name)))
        }

        async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<Role>, StoreError> {
            let t = self.tables.read().await;
            let rows = t.roles.values().filter(|r| contains_ignore_case(&r.name, query)).cloned();
            Ok(paged(rows, |r| (r.name.clone(), r.id), page))
        }

        async fn insert(&self, role: NewRole) -> Result<Role, StoreError> {
            let mut t = self.tables.write().await;
            if t.roles.values().any(|r| eq_ignore_case(&r.name, &role.name)) {
                return Err(StoreError::Unique("uniq_role_name_ci".into()));
            }
            let id = t.next_id();
            let row = Role { id, name: role.name };
            t.roles.insert(id, row.clone());
            Ok(row)
        }

        async fn update(&self, role: &Role) -> Result<Role, StoreError> {
            let mut t = self.tables.write().await;
            if t.roles.values().any(|r| r.id != role.id && eq_ignore_case(&r.name, &role.name)) {
                return Err(StoreError::Unique("uniq_role_name_ci".into()));
            }
            let slot = t.roles.get_mut(&role.id).ok_or_else(|| StoreError::Db(format!("role {} vanished", role.id)))?;
            *slot = role.clone();
            Ok(role.clone())
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
            let mut t = self.tables.write().await;
            if t.user_references(UserParent::Role(id)) {
                return Err(StoreError::ForeignKey("fk_user_role".into()));
            }
            t.roles.remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl CityRepository for MemoryStore {
        async fn find_by_id(&self, id: i32) -> Result<Option<City>, StoreError> {
            Ok(self.tables.read().await.cities.get(&id).cloned())
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.cities.contains_key(&id))
        }

        async fn exists_by_name_in_department_ignore_case(&self, name: &str, department_id: i32) -> Result<bool, StoreError> {
            let t = self.tables.read().await;
            Ok(t.cities.values().any(|c| c.department_id == department_id && eq_ignore_case(&c.name, name)))
        }

        async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<City>, StoreError> {
            let t = self.tables.read().await;
            let rows = t.cities.values().filter(|c| contains_ignore_case(&c.name, query)).cloned();
            Ok(paged(rows, |c| (c.name.clone(), c.id), page))
        }

        async fn find_page_by_department(&self, department_id: i32, page: Pagination) -> Result<Page<City>, StoreError> {
            let t = self.tables.read().await;
            let rows = t.cities.values().filter(|c| c.department_id == department_id).cloned();
            Ok(paged(rows, |c| (c.name.clone(), c.id), page))
        }

        async fn insert(&self, city: NewCity) -> Result<City, StoreError> {
            let mut t = self.tables.write().await;
            if !t.departments.contains_key(&city.department_id) {
                return Err(StoreError::ForeignKey("fk_city_department".into()));
            }
            if t.cities.values().any(|c| c.department_id == city.department_id && eq_ignore_case(&c.name, &city.name)) {
                return Err(StoreError::Unique("uniq_city_department_name_ci".into()));
            }
            let id = t.next_id();
            let row = City { id, name: city.name, department_id: city.department_id };
            t.cities.insert(id, row.clone());
            Ok(row)
        }

        async fn update(&self, city: &City) -> Result<City, StoreError> {
            let mut t = self.tables.write().await;
            if !t.departments.contains_key(&city.department_id) {
                return Err(StoreError::ForeignKey("fk_city_department".into()));
            }
            if t.cities.values().any(|c| c.id != city.id && c.department_id == city.department_id && eq_ignore_case(&c.name, &city.name)) {
                return Err(StoreError::Unique("uniq_city_department_name_ci".into()));
            }
            let slot = t.cities.get_mut(&city.id).ok_or_else(|| StoreError::Db(format!("city {} vanished", city.id)))?;
            *slot = city.clone();
            Ok(city.clone())
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
            let mut t = self.tables.write().await;
            if t.user_references(UserParent::City(id)) {
                return Err(StoreError::ForeignKey("fk_user_city".into()));
            }
            t.cities.remove(&id);
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MemoryStore {
        async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
            Ok(self.tables.read().await.users.get(&id).cloned())
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.users.contains_key(&id))
        }

        async fn exists_by_email_ignore_case(&self, email: &str) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.email_taken(email, None))
        }

        async fn exists_by_parent(&self, parent: UserParent) -> Result<bool, StoreError> {
            Ok(self.tables.read().await.user_references(parent))
        }

        async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<User>, StoreError> {
            let t = self.tables.read().await;
            let rows = t.users.values().filter(|u| contains_ignore_case(&u.name, query)).cloned();
            Ok(paged(rows, |u| (u.name.clone(), u.id), page))
        }

        async fn find_page_by_parent(&self, parent: UserParent, page: Pagination) -> Result<Page<User>, StoreError> {
            let t = self.tables.read().await;
            let rows = t
                .users
                .values()
                .filter(|u| match parent {
                    UserParent::City(id) => u.city_id == id,
                    UserParent::Department(id) => u.department_id == id,
                    UserParent::Role(id) => u.role_id == id,
                })
                .cloned();
            Ok(paged(rows, |u| (u.name.clone(), u.id), page))
        }

        async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
            let mut t = self.tables.write().await;
            t.check_user_refs(user.city_id, user.department_id, user.role_id)?;
            if t.email_taken(&user.email, None) {
                return Err(StoreError::Unique("uniq_user_email_ci".into()));
            }
            let id = t.next_id();
            let row = user.into_user(id);
            t.users.insert(id, row.clone());
            Ok(row)
        }

        async fn update(&self, user: &User) -> Result<User, StoreError> {
            let mut t = self.tables.write().await;
            t.check_user_refs(user.city_id, user.department_id, user.role_id)?;
            if t.email_taken(&user.email, Some(user.id)) {
                return Err(StoreError::Unique("uniq_user_email_ci".into()));
            }
            let slot = t.users.get_mut(&user.id).ok_or_else(|| StoreError::Db(format!("user {} vanished", user.id)))?;
            *slot = user.clone();
            Ok(user.clone())
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
            self.tables.write().await.users.remove(&id);
            Ok(())
        }
    }
}
