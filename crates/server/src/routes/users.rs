use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::pagination::Page;
use service::domain::{CreateUserInput, UserPatch};
use service::view::UserView;
use tracing::info;

use crate::errors::{ApiJson, JsonApiError};
use crate::routes::{AppState, SearchQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search).post(create))
        .route("/:id", get(find).put(update).delete(remove))
}

async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Result<Json<Page<UserView>>, JsonApiError> {
    let page = state.services.users.search(q.q.as_deref(), q.pagination()).await?;
    info!(count = page.content.len(), total = page.total_elements, "user_search");
    Ok(Json(page))
}

async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CreateUserInput>) -> Result<(StatusCode, Json<UserView>), JsonApiError> {
    let view = state.services.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn find(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(state.services.users.find_by_id(id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<UserView>, JsonApiError> {
    Ok(Json(state.services.users.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if state.services.users.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("user {id} not found"))))
    }
}
