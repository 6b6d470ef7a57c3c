use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::normalize::department_slug;
use crate::server::AppState;
use crate::server::dto::{CreateRefRequest, ListRefParams, UpdateRefRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::require_field;
use crate::types::Department;

pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListRefParams>,
) -> impl IntoResponse {
    let departments = state
        .store
        .list_departments(params.year)
        .api_err("Failed to list departments")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(departments)))
}

pub async fn create_department(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRefRequest>,
) -> impl IntoResponse {
    let name = req.name.trim().to_string();
    require_field(&name, "name")?;

    let store = state.store.as_ref();
    let id = department_slug(&name);

    // Upsert: an existing id is reactivated, keeping its year when the
    // request carries none
    store
        .upsert_department(&id, &name, req.year)
        .api_err("Failed to create department")?;

    let department = store
        .get_department(&id)
        .api_err("Failed to get department")?
        .or_not_found("Department not found")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(department))))
}

pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRefRequest>,
) -> impl IntoResponse {
    let id = id.trim().to_uppercase();
    let name = req.name.trim().to_string();
    require_field(&name, "name")?;

    let store = state.store.as_ref();
    store
        .get_department(&id)
        .api_err("Failed to get department")?
        .or_not_found("Department not found")?;

    let department = Department {
        id,
        name,
        active: req.active,
        year: req.year,
    };
    store
        .update_department(&department)
        .api_err("Failed to update department")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(department)))
}

pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deactivated = state
        .store
        .deactivate_department(&id)
        .api_err("Failed to delete department")?;

    if !deactivated {
        return Err(ApiError::not_found("Department not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_department_years(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let years = state
        .store
        .list_department_years()
        .api_err("Failed to list department years")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(years)))
}
