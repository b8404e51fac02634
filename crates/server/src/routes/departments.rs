use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::pagination::Page;
use service::domain::{CreateDepartmentInput, DepartmentPatch};
use service::view::{CityView, DepartmentView, UserView};

use crate::errors::{ApiJson, JsonApiError};
use crate::routes::{AppState, SearchQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search).post(create))
        .route("/:id", get(find).put(update).delete(remove))
        .route("/:id/cities", get(cities))
        .route("/:id/users", get(users))
}

async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Result<Json<Page<DepartmentView>>, JsonApiError> {
    Ok(Json(state.services.departments.search(q.q.as_deref(), q.pagination()).await?))
}

async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateDepartmentInput>,
) -> Result<(StatusCode, Json<DepartmentView>), JsonApiError> {
    let view = state.services.departments.create(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn find(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<DepartmentView>, JsonApiError> {
    Ok(Json(state.services.departments.find_by_id(id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(patch): ApiJson<DepartmentPatch>,
) -> Result<Json<DepartmentView>, JsonApiError> {
    Ok(Json(state.services.departments.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if state.services.departments.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("department {id} not found"))))
    }
}

async fn cities(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Page<CityView>>, JsonApiError> {
    Ok(Json(state.services.cities.list_by_department(id, q.pagination()).await?))
}

async fn users(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Page<UserView>>, JsonApiError> {
    Ok(Json(state.services.users.list_by_department(id, q.pagination()).await?))
}
