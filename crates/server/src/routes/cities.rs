use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::pagination::Page;
use service::domain::{CityPatch, CreateCityInput};
use service::view::{CityView, UserView};

use crate::errors::{ApiJson, JsonApiError};
use crate::routes::{AppState, SearchQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search).post(create))
        .route("/:id", get(find).put(update).delete(remove))
        .route("/:id/users", get(users))
}

async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Result<Json<Page<CityView>>, JsonApiError> {
    Ok(Json(state.services.cities.search(q.q.as_deref(), q.pagination()).await?))
}

async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CreateCityInput>) -> Result<(StatusCode, Json<CityView>), JsonApiError> {
    let view = state.services.cities.create(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn find(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<CityView>, JsonApiError> {
    Ok(Json(state.services.cities.find_by_id(id).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(patch): ApiJson<CityPatch>,
) -> Result<Json<CityView>, JsonApiError> {
    Ok(Json(state.services.cities.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if state.services.cities.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("city {id} not found"))))
    }
}

async fn users(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Page<UserView>>, JsonApiError> {
    Ok(Json(state.services.users.list_by_city(id, q.pagination()).await?))
}
