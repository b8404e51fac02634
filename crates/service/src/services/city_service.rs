use std::sync::Arc;

use common::pagination::{Page, Pagination};
use tracing::{info, instrument};

use crate::domain::{City, CityPatch, CreateCityInput, Department, NewCity, UserParent};
use crate::errors::ServiceError;
use crate::merge::merge_city;
use crate::repository::{CityRepository, DepartmentRepository, UserRepository};
use crate::services::{search_term, Lookup};
use crate::uniqueness::ensure_unique;
use crate::view::CityView;

const DUPLICATE_NAME: &str = "city name already exists in department";

pub struct CityService {
    cities: Arc<dyn CityRepository>,
    departments: Arc<dyn DepartmentRepository>,
    users: Arc<dyn UserRepository>,
}

impl CityService {
    pub fn new(
        cities: Arc<dyn CityRepository>,
        departments: Arc<dyn DepartmentRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { cities, departments, users }
    }

    async fn require_department(&self, id: i32) -> Result<Department, ServiceError> {
        self.departments.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("department"))
    }

    #[instrument(skip(self, input), fields(department_id = input.department_id))]
    pub async fn create(&self, input: CreateCityInput) -> Result<CityView, ServiceError> {
        models::city::validate_name(&input.name)?;
        ensure_unique(
            Some(input.name.as_str()),
            None,
            |n| self.cities.exists_by_name_in_department_ignore_case(n, input.department_id),
            DUPLICATE_NAME,
        )
        .await?;
        let department = self.require_department(input.department_id).await?;
        let created = self
            .cities
            .insert(NewCity { name: input.name, department_id: department.id })
            .await
            .map_err(ServiceError::on_write)?;
        info!(city_id = created.id, department_id = department.id, "city_created");
        Ok(CityView::project(&created, Some(&department)))
    }

    /// Renames and/or moves a city. A move is refused while users still
    /// reference the city, since their department would no longer match.
    #[instrument(skip(self, patch), fields(city_id = id))]
    pub async fn update(&self, id: i32, patch: CityPatch) -> Result<CityView, ServiceError> {
        let mut city = self.cities.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("city"))?;
        if let Some(name) = patch.name.as_option() {
            models::city::validate_name(name)?;
        }

        let target_department = patch.department_id.resolve(city.department_id);
        let moving = target_department != city.department_id;
        let department = if moving {
            let department = self.require_department(target_department).await?;
            if self.users.exists_by_parent(UserParent::City(id)).await? {
                return Err(ServiceError::Conflict(format!(
                    "city {id} is referenced by users and cannot change department"
                )));
            }
            Some(department)
        } else {
            self.departments.find_by_id(city.department_id).await?
        };

        // Unchanged (name, department) pairs skip the probe.
        let final_name = patch.name.as_option().unwrap_or(&city.name).clone();
        let current_name = if moving { None } else { Some(city.name.as_str()) };
        ensure_unique(
            Some(final_name.as_str()),
            current_name,
            |n| self.cities.exists_by_name_in_department_ignore_case(n, target_department),
            DUPLICATE_NAME,
        )
        .await?;

        merge_city(&mut city, patch);
        let updated = self.cities.update(&city).await.map_err(ServiceError::on_write)?;
        info!(city_id = id, department_id = updated.department_id, moved = moving, "city_updated");
        Ok(CityView::project(&updated, department.as_ref()))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<CityView, ServiceError> {
        let city = self.cities.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("city"))?;
        let department = self.departments.find_by_id(city.department_id).await?;
        Ok(CityView::project(&city, department.as_ref()))
    }

    pub async fn search(&self, query: Option<&str>, page: Pagination) -> Result<Page<CityView>, ServiceError> {
        let found = self.cities.find_page_by_name(search_term(query), page).await?;
        self.project_page(found).await
    }

    /// Cities of one department; an unknown department yields an empty page.
    pub async fn list_by_department(&self, department_id: i32, page: Pagination) -> Result<Page<CityView>, ServiceError> {
        let found = self.cities.find_page_by_department(department_id, page).await?;
        self.project_page(found).await
    }

    #[instrument(skip(self), fields(city_id = id))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        if !self.cities.exists_by_id(id).await? {
            return Ok(false);
        }
        self.cities.delete_by_id(id).await.map_err(|e| ServiceError::on_delete(e, "city"))?;
        info!(city_id = id, "city_deleted");
        Ok(true)
    }

    async fn project_page(&self, found: Page<City>) -> Result<Page<CityView>, ServiceError> {
        let mut departments = Lookup::new();
        let mut views = Vec::with_capacity(found.content.len());
        for city in &found.content {
            let department = departments.get(city.department_id, |id| self.departments.find_by_id(id)).await?;
            views.push(CityView::project(city, department.as_ref()));
        }
        Ok(found.with_content(views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use crate::test_support::{seeded, Seed};

    #[tokio::test]
    async fn create_resolves_department_name() {
        let (services, Seed { cusco, .. }) = seeded().await;
        let view = services
            .cities
            .create(CreateCityInput { name: "Sicuani".into(), department_id: cusco.id })
            .await
            .unwrap();
        assert_eq!(view.department_id, Some(cusco.id));
        assert_eq!(view.department_name.as_deref(), Some("Cusco"));
    }

    #[tokio::test]
    async fn create_with_unknown_department_is_not_found() {
        let (services, _) = seeded().await;
        let err = services
            .cities
            .create(CreateCityInput { name: "Nowhere".into(), department_id: 999 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn name_is_unique_per_department_only() {
        let (services, Seed { lima, cusco, .. }) = seeded().await;
        let err = services
            .cities
            .create(CreateCityInput { name: "MIRAFLORES".into(), department_id: lima.id })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let other = services
            .cities
            .create(CreateCityInput { name: "Miraflores".into(), department_id: cusco.id })
            .await
            .unwrap();
        assert_eq!(other.department_id, Some(cusco.id));
    }

    #[tokio::test]
    async fn move_of_referenced_city_is_conflict() {
        let (services, Seed { miraflores, cusco, .. }) = seeded().await;
        let err = services
            .cities
            .update(miraflores.id, CityPatch { name: Patch::Unset, department_id: Patch::Set(cusco.id) })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn move_of_unreferenced_city_succeeds() {
        let (services, Seed { lima, cusco, .. }) = seeded().await;
        let barranco = services
            .cities
            .create(CreateCityInput { name: "Barranco".into(), department_id: lima.id })
            .await
            .unwrap();
        let moved = services
            .cities
            .update(barranco.id, CityPatch { name: Patch::Unset, department_id: Patch::Set(cusco.id) })
            .await
            .unwrap();
        assert_eq!(moved.name, "Barranco");
        assert_eq!(moved.department_name.as_deref(), Some("Cusco"));
    }

    #[tokio::test]
    async fn rename_keeps_department() {
        let (services, Seed { miraflores, lima, .. }) = seeded().await;
        let view = services
            .cities
            .update(miraflores.id, CityPatch { name: Patch::Set("MIRAFLORES".into()), department_id: Patch::Unset })
            .await
            .unwrap();
        assert_eq!(view.name, "MIRAFLORES");
        assert_eq!(view.department_id, Some(lima.id));
    }

    #[tokio::test]
    async fn list_by_department_filters_and_sorts() {
        let (services, Seed { lima, cusco, .. }) = seeded().await;
        services
            .cities
            .create(CreateCityInput { name: "Barranco".into(), department_id: lima.id })
            .await
            .unwrap();
        let page = services.cities.list_by_department(lima.id, Pagination::default()).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Barranco", "Miraflores"]);

        let cusco_page = services.cities.list_by_department(cusco.id, Pagination::default()).await.unwrap();
        assert_eq!(cusco_page.total_elements, 1);

        let none = services.cities.list_by_department(999, Pagination::default()).await.unwrap();
        assert!(none.content.is_empty());
        assert_eq!(none.total_elements, 0);
    }

    #[tokio::test]
    async fn delete_referenced_city_is_conflict() {
        let (services, Seed { miraflores, .. }) = seeded().await;
        let err = services.cities.delete(miraflores.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(!services.cities.delete(999).await.unwrap());
    }
}
