use crate::controller::ApiResponse;
use crate::extractors::acting_user::{ActingUser, AdminUser};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{manager as ManagerApi, managers::Model, Id};
use log::*;
use serde_json::json;

/// GET all Managers
#[utoipa::path(
    get,
    path = "/managers",
    responses(
        (status = 200, description = "Successfully retrieved all Managers", body = [domain::managers::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn index(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Managers");

    let managers = ManagerApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), managers)))
}

/// POST create a new Manager
#[utoipa::path(
    post,
    path = "/managers",
    request_body = domain::managers::Model,
    responses(
        (status = 201, description = "Successfully created a new Manager", body = domain::managers::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins may add managers"),
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
    Json(manager_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Manager: {}", manager_model.email);

    let manager = ManagerApi::create(app_state.db_conn_ref(), manager_model).await?;

    debug!("New Manager: {manager:?}");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), manager)),
    ))
}

/// DELETE a Manager. Their lead groups are left without a manager.
#[utoipa::path(
    delete,
    path = "/managers/{id}",
    params(
        ("id" = Uuid, Path, description = "Manager id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the Manager"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins may remove managers"),
        (status = 404, description = "Manager not found")
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
    debug!("DELETE Manager by id: {id}");

    ManagerApi::delete(app_state.db_conn_ref(), id).await?;
    Ok(Json(json!({"id": id})))
}
