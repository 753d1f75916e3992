use crate::controller::ApiResponse;
use crate::extractors::acting_user::{ActingUser, AdminUser};
use crate::params::employee::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{employee as EmployeeApi, employees::Model, Id};
use log::*;
use serde_json::json;

/// GET Employees, optionally only those reporting to one manager
#[utoipa::path(
    get,
    path = "/employees",
    params(IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved Employees", body = [domain::employees::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn index(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Employees with params: {params:?}");

    let employees = EmployeeApi::find_by(app_state.db_conn_ref(), params).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), employees)))
}

/// POST create a new Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = domain::employees::Model,
    responses(
        (status = 201, description = "Successfully created a new Employee", body = domain::employees::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins may add employees"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create(
    AdminUser(_admin): AdminUser,
    State(app_state): State<AppState>,
    Json(employee_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Employee: {}", employee_model.email);

    let employee = EmployeeApi::create(app_state.db_conn_ref(), employee_model).await?;

    debug!("New Employee: {employee:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), employee)),
    ))
}

/// DELETE an Employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(
        ("id" = Uuid, Path, description = "Employee id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the Employee"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins may remove employees"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete(
    AdminUser(_admin): AdminUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Employee by id: {id}");

    EmployeeApi::delete(app_state.db_conn_ref(), id).await?;
    Ok(Json(json!({"id": id})))
}
