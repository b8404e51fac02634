use std::sync::Arc;

use common::pagination::{Page, Pagination};
use tracing::{info, instrument};

use crate::domain::{CreateDepartmentInput, DepartmentPatch, NewDepartment};
use crate::errors::ServiceError;
use crate::merge::merge_department;
use crate::repository::DepartmentRepository;
use crate::services::search_term;
use crate::uniqueness::ensure_unique;
use crate::view::DepartmentView;

const DUPLICATE_NAME: &str = "department name already exists";

pub struct DepartmentService {
    departments: Arc<dyn DepartmentRepository>,
}

impl DepartmentService {
    pub fn new(departments: Arc<dyn DepartmentRepository>) -> Self { Self { departments } }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateDepartmentInput) -> Result<DepartmentView, ServiceError> {
        models::department::validate_name(&input.name)?;
        ensure_unique(Some(input.name.as_str()), None, |n| self.departments.exists_by_name_ignore_case(n), DUPLICATE_NAME).await?;
        let created = self
            .departments
            .insert(NewDepartment { name: input.name })
            .await
            .map_err(ServiceError::on_write)?;
        info!(department_id = created.id, "department_created");
        Ok(DepartmentView::from(&created))
    }

    #[instrument(skip(self, patch), fields(department_id = id))]
    pub async fn update(&self, id: i32, patch: DepartmentPatch) -> Result<DepartmentView, ServiceError> {
        let mut department = self.departments.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("department"))?;
        if let Some(name) = patch.name.as_option() {
            models::department::validate_name(name)?;
        }
        ensure_unique(
            patch.name.as_option().map(String::as_str),
            Some(department.name.as_str()),
            |n| self.departments.exists_by_name_ignore_case(n),
            DUPLICATE_NAME,
        )
        .await?;
        merge_department(&mut department, patch);
        let updated = self.departments.update(&department).await.map_err(ServiceError::on_write)?;
        info!(department_id = id, "department_updated");
        Ok(DepartmentView::from(&updated))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<DepartmentView, ServiceError> {
        let department = self.departments.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("department"))?;
        Ok(DepartmentView::from(&department))
    }

    /// Case-insensitive name search; `None` or blank lists everything.
    pub async fn search(&self, query: Option<&str>, page: Pagination) -> Result<Page<DepartmentView>, ServiceError> {
        let found = self.departments.find_page_by_name(search_term(query), page).await?;
        Ok(found.with_content(found.content.iter().map(DepartmentView::from).collect()))
    }

    pub async fn list(&self, page: Pagination) -> Result<Page<DepartmentView>, ServiceError> {
        self.search(None, page).await
    }

    /// `Ok(false)` when there was nothing to delete.
    #[instrument(skip(self), fields(department_id = id))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        if !self.departments.exists_by_id(id).await? {
            return Ok(false);
        }
        self.departments.delete_by_id(id).await.map_err(|e| ServiceError::on_delete(e, "department"))?;
        info!(department_id = id, "department_deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;
    use crate::test_support::{seeded, Seed};

    #[tokio::test]
    async fn create_rejects_case_insensitive_duplicate() {
        let (services, _) = seeded().await;
        let err = services
            .departments
            .create(CreateDepartmentInput { name: "LIMA".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let (services, _) = seeded().await;
        let err = services.departments.create(CreateDepartmentInput { name: "  ".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn rename_to_own_name_in_other_case_is_allowed() {
        let (services, Seed { lima, .. }) = seeded().await;
        let view = services
            .departments
            .update(lima.id, DepartmentPatch { name: Patch::Set("LIMA".into()) })
            .await
            .unwrap();
        assert_eq!(view.name, "LIMA");
    }

    #[tokio::test]
    async fn rename_onto_other_department_conflicts() {
        let (services, Seed { lima, .. }) = seeded().await;
        let err = services
            .departments
            .update(lima.id, DepartmentPatch { name: Patch::Set("cusco".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let (services, _) = seeded().await;
        let err = services.departments.update(404, DepartmentPatch::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let (services, _) = seeded().await;
        services.departments.create(CreateDepartmentInput { name: "Arequipa".into() }).await.unwrap();
        let page = services.departments.list(Pagination::default()).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Arequipa", "Cusco", "Lima"]);
        assert_eq!(page.total_elements, 3);
    }

    #[tokio::test]
    async fn delete_blocked_by_cities_is_conflict() {
        let (services, Seed { lima, .. }) = seeded().await;
        let err = services.departments.delete(lima.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(services.departments.find_by_id(lima.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_unreferenced_then_absent() {
        let (services, _) = seeded().await;
        let tumbes = services.departments.create(CreateDepartmentInput { name: "Tumbes".into() }).await.unwrap();
        assert!(services.departments.delete(tumbes.id).await.unwrap());
        assert!(!services.departments.delete(tumbes.id).await.unwrap());
    }
}
