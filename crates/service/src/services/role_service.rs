use std::sync::Arc;

use common::pagination::{Page, Pagination};
use tracing::{info, instrument};

use crate::domain::{CreateRoleInput, RolePatch, NewRole};
use crate::errors::ServiceError;
use crate::merge::merge_role;
use crate::repository::RoleRepository;
use crate::services::search_term;
use crate::uniqueness::ensure_unique;
use crate::view::RoleView;

const DUPLICATE_NAME: &str = "role name already exists";

pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self { Self { roles } }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateRoleInput) -> Result<RoleView, ServiceError> {
        models::role::validate_name(&input.name)?;
        ensure_unique(Some(input.name.as_str()), None, |n| self.roles.exists_by_name_ignore_case(n), DUPLICATE_NAME).await?;
        let created = self
            .roles
            .insert(NewRole { name: input.name })
            .await
            .map_err(ServiceError::on_write)?;
        info!(role_id = created.id, "role_created");
        Ok(RoleView::from(&created))
    }

    #[instrument(skip(self, patch), fields(role_id = id))]
    pub async fn update(&self, id: i32, patch: RolePatch) -> Result<RoleView, ServiceError> {
        let mut role = self.roles.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("role"))?;
        if let Some(name) = patch.name.as_option() {
            models::role::validate_name(name)?;
        }
        ensure_unique(
            patch.name.as_option().map(String::as_str),
            Some(role.name.as_str()),
            |n| self.roles.exists_by_name_ignore_case(n),
            DUPLICATE_NAME,
        )
        .await?;
        merge_role(&mut role, patch);
        let updated = self.roles.update(&role).await.map_err(ServiceError::on_write)?;
        info!(role_id = id, "role_updated");
        Ok(RoleView::from(&updated))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<RoleView, ServiceError> {
        let role = self.roles.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("role"))?;
        Ok(RoleView::from(&role))
    }

    /// Case-insensitive name search; `None` or blank lists everything.
    pub async fn search(&self, query: Option<&str>, page: Pagination) -> Result<Page<RoleView>, ServiceError> {
        let found = self.roles.find_page_by_name(search_term(query), page).await?;
        Ok(found.with_content(found.content.iter().map(RoleView::from).collect()))
    }

    pub async fn list(&self, page: Pagination) -> Result<Page<RoleView>, ServiceError> {
        self.search(None, page).await
    }

    /// `Ok(false)` when there was nothing to delete.
    #[instrument(skip(self), fields(role_id = id))]
    pub async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        if !self.roles.exists_by_id(id).await? {
            return Ok(false);
        }
        self.roles.delete_by_id(id).await.map_err(|e| ServiceError::on_delete(e, "role"))?;
        info!(role_id = id, "role_deleted");
        Ok(true)
    }
}
