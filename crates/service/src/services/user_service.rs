use std::sync::Arc;

use chrono::Utc;
use common::pagination::{Page, Pagination};
use tracing::{info, instrument};

use crate::domain::{City, CreateUserInput, Department, NewUser, Role, User, UserParent, UserPatch};
use crate::errors::ServiceError;
use crate::merge::{merge_user, ResolvedRelations};
use crate::repository::{CityRepository, DepartmentRepository, RoleRepository, UserRepository};
use crate::services::{search_term, Lookup};
use crate::uniqueness::ensure_unique;
use crate::validation::{validate_create_user, validate_user_patch, Placement};
use crate::view::{UserRelations, UserView};

const DUPLICATE_EMAIL: &str = "email already registered";

/// User lifecycle. Every write keeps `user.city.department == user.department`.
///
/// ```
/// use std::sync::Arc;
/// use service::domain::{CreateCityInput, CreateDepartmentInput, CreateRoleInput, CreateUserInput};
/// use service::repository::memory::MemoryStore;
/// use service::services::Services;
///
/// tokio_test::block_on(async {
///     let services = Services::from_store(Arc::new(MemoryStore::new()));
///     let lima = services.departments.create(CreateDepartmentInput { name: "Lima".into() }).await.unwrap();
///     let city = services
///         .cities
///         .create(CreateCityInput { name: "Miraflores".into(), department_id: lima.id })
///         .await
///         .unwrap();
///     let role = services.roles.create(CreateRoleInput { name: "Courier".into() }).await.unwrap();
///
///     let user = services
///         .users
///         .create(CreateUserInput {
///             name: "Maria Lopez".into(),
///             email: "maria@example.com".into(),
///             phone: None,
///             registered_on: None,
///             address_detail: None,
///             city_id: city.id,
///             department_id: lima.id,
///             role_id: role.id,
///         })
///         .await
///         .unwrap();
///     assert_eq!(user.city_name.as_deref(), Some("Miraflores"));
/// });
/// ```
pub struct UserService {
    users: Arc<dyn UserRepository>,
    cities: Arc<dyn CityRepository>,
    departments: Arc<dyn DepartmentRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        cities: Arc<dyn CityRepository>,
        departments: Arc<dyn DepartmentRepository>,
        roles: Arc<dyn RoleRepository>,
    ) -> Self {
        Self { users, cities, departments, roles }
    }

    async fn require_city(&self, id: i32) -> Result<City, ServiceError> {
        self.cities.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("city"))
    }

    async fn require_department(&self, id: i32) -> Result<Department, ServiceError> {
        self.departments.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("department"))
    }

    async fn require_role(&self, id: i32) -> Result<Role, ServiceError> {
        self.roles.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("role"))
    }

    async fn fetch_pair(&self, city_id: i32, department_id: i32) -> Result<(City, Department), ServiceError> {
        let city = self.require_city(city_id).await?;
        let department = self.require_department(department_id).await?;
        Ok((city, department))
    }

    #[instrument(skip(self, input), fields(city_id = input.city_id, department_id = input.department_id, role_id = input.role_id))]
    pub async fn create(&self, input: CreateUserInput) -> Result<UserView, ServiceError> {
        validate_create_user(&input)?;
        ensure_unique(
            Some(input.email.as_str()),
            None,
            |e| self.users.exists_by_email_ignore_case(e),
            DUPLICATE_EMAIL,
        )
        .await?;
        // Every reference resolves before the pair is checked.
        let (city, department) = self.fetch_pair(input.city_id, input.department_id).await?;
        let role = self.require_role(input.role_id).await?;
        let (city, department) = Placement::new(city, department)?.into_parts();

        let created = self
            .users
            .insert(NewUser {
                name: input.name,
                email: input.email,
                phone: input.phone,
                registered_on: input.registered_on.unwrap_or_else(|| Utc::now().date_naive()),
                address_detail: input.address_detail,
                city_id: city.id,
                department_id: department.id,
                role_id: role.id,
            })
            .await
            .map_err(ServiceError::on_write)?;
        info!(user_id = created.id, "user_created");
        let relations = UserRelations { city: Some(city), department: Some(department), role: Some(role) };
        Ok(UserView::project(&created, &relations))
    }

    /// Applies a partial update. The city/department pair is re-validated
    /// only when the patch names either of them; the missing half comes from
    /// the stored row.
    #[instrument(skip(self, patch), fields(user_id = id))]
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<UserView, ServiceError> {
        let mut user = self.users.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        validate_user_patch(&patch)?;
        ensure_unique(
            patch.email.as_option().map(String::as_str),
            Some(user.email.as_str()),
            |e| self.users.exists_by_email_ignore_case(e),
            DUPLICATE_EMAIL,
        )
        .await?;

        let pair = if patch.touches_placement() {
            let city_id = patch.city_id.resolve(user.city_id);
            let department_id = patch.department_id.resolve(user.department_id);
            Some(self.fetch_pair(city_id, department_id).await?)
        } else {
            None
        };
        let role = match patch.role_id.into_option() {
            Some(role_id) => Some(self.require_role(role_id).await?),
            None => None,
        };
        let placement = pair.map(|(city, department)| Placement::new(city, department)).transpose()?;
        let resolved = ResolvedRelations { placement, role };

        merge_user(&mut user, patch, &resolved);
        let updated = self.users.update(&user).await.map_err(ServiceError::on_write)?;
        info!(user_id = id, relocated = resolved.placement.is_some(), "user_updated");

        let ResolvedRelations { placement, role } = resolved;
        let (city, department) = match placement {
            Some(p) => {
                let (city, department) = p.into_parts();
                (Some(city), Some(department))
            }
            None => (
                self.cities.find_by_id(updated.city_id).await?,
                self.departments.find_by_id(updated.department_id).await?,
            ),
        };
        let role = match role {
            Some(role) => Some(role),
            None => self.roles.find_by_id(updated.role_id).await?,
        };
        Ok(UserView::project(&updated, &UserRelations { city, department, role }))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<UserView, ServiceError> {
        let user = self.users.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        let relations = UserRelations {
            city: self.cities.find_by_id(user.city_id).await?,
            department: self.departments.find_by_id(user.department_id).await?,
            role: self.roles.find_by_id(user.role_id).await?,
        };
        Ok(UserView::project(&user, &relations))
    }

    pub async fn search(&self, query: Option<&str>, page: Pagination) -> Result<Page<UserView>, ServiceError> {
        let found = self.users.find_page_by_name(search_term(query), page).await?;
        self.project_page(found).await
    }

    pub async fn list_by_city(&self, city_id: i32, page: Pagination) -> Result<Page<UserView>, ServiceError> {
        self.list_by_parent(UserParent::City(city_id), page).await
    }

    pub async fn list_by_department(&self, department_id: i32, page: Pagination) -> Result<Page<UserView>, ServiceError> {
        self.list_by_parent(UserParent::Department(department_id), page).await
    }

    pub async fn list_by_role(&self, role_id: i32, page: Pagination) -> Result<Page<UserView>, ServiceError> {
        self.list_by_parent(UserParent::Role(role_id), page).await
    }

    async fn list_by_parent(&self, parent: UserParent, page: Pagination) -> Result<Page<UserView>, ServiceError> {
        let found = self.users.find_page_by_parent(parent, page).await?;
        self.project_page(found).await
    }

    #[instrument(skip(self), fields(user_id = id))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        if !self.users.exists_by_id(id).await? {
            return Ok(false);
        }
        self.users.delete_by_id(id).await.map_err(|e| ServiceError::on_delete(e, "user"))?;
        info!(user_id = id, "user_deleted");
        Ok(true)
    }

    async fn project_page(&self, found: Page<User>) -> Result<Page<UserView>, ServiceError> {
        let mut cities = Lookup::new();
        let mut departments = Lookup::new();
        let mut roles = Lookup::new();
        let mut views = Vec::with_capacity(found.content.len());
        for user in &found.content {
            let relations = UserRelations {
                city: cities.get(user.city_id, |id| self.cities.find_by_id(id)).await?,
                department: departments.get(user.department_id, |id| self.departments.find_by_id(id)).await?,
                role: roles.get(user.role_id, |id| self.roles.find_by_id(id)).await?,
            };
            views.push(UserView::project(user, &relations));
        }
        Ok(found.with_content(views))
    }
}
