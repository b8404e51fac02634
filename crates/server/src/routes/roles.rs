use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::pagination::Page;
use service::domain::{CreateRoleInput, RolePatch};
use service::view::{RoleView, UserView};

use crate::errors::{ApiJson, JsonApiError};
use crate::routes::{AppState, SearchQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search).post(create))
        .route("/:id", get(find).put(update).delete(remove))
        .route("/:id/users", get(users))
}

async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Result<Json<Page<RoleView>>, JsonApiError> {
    Ok(Json(state.services.roles.search(q.q.as_deref(), q.pagination()).await?))
}

async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CreateRoleInput>) -> Result<(StatusCode, Json<RoleView>), JsonApiError> {
    let view = state.services.roles.create(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn find(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<RoleView>, JsonApiError> {
    Ok(Json(state.services.roles.find_by_id(id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(patch): ApiJson<RolePatch>,
) -> Result<Json<RoleView>, JsonApiError> {
    Ok(Json(state.services.roles.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if state.services.roles.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("role {id} not found"))))
    }
}

async fn users(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Page<UserView>>, JsonApiError> {
    Ok(Json(state.services.users.list_by_role(id, q.pagination()).await?))
}
