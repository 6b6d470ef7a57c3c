use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::normalize::group_slug;
use crate::server::AppState;
use crate::server::dto::{CreateRefRequest, ListRefParams, UpdateRefRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::require_field;
use crate::types::DocGroup;

pub async fn list_doc_groups(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListRefParams>,
) -> impl IntoResponse {
    let groups = state
        .store
        .list_doc_groups(params.year)
        .api_err("Failed to list groups")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(groups)))
}

pub async fn create_doc_group(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRefRequest>,
) -> impl IntoResponse {
    let name = req.name.trim().to_string();
    require_field(&name, "name")?;

    let store = state.store.as_ref();
    let id = group_slug(&name);

    store
        .upsert_doc_group(&id, &name, req.year)
        .api_err("Failed to create group")?;

    let group = store
        .get_doc_group(&id)
        .api_err("Failed to get group")?
        .or_not_found("Group not found")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(group))))
}

pub async fn update_doc_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRefRequest>,
) -> impl IntoResponse {
    let id = id.trim().to_string();
    let name = req.name.trim().to_string();
    require_field(&name, "name")?;

    let store = state.store.as_ref();
    store
        .get_doc_group(&id)
        .api_err("Failed to get group")?
        .or_not_found("Group not found")?;

    let group = DocGroup {
        id,
        name,
        active: req.active,
        year: req.year,
    };
    store
        .update_doc_group(&group)
        .api_err("Failed to update group")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(group)))
}

pub async fn delete_doc_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deactivated = state
        .store
        .deactivate_doc_group(&id)
        .api_err("Failed to delete group")?;

    if !deactivated {
        return Err(ApiError::not_found("Group not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_doc_group_years(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let years = state
        .store
        .list_doc_group_years()
        .api_err("Failed to list group years")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(years)))
}
