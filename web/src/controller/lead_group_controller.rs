use crate::controller::ApiResponse;
use crate::extractors::acting_user::ActingUser;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{lead_group as LeadGroupApi, lead_groups::Model, Id};
use log::*;
use serde_json::json;

/// GET all Lead Groups
#[utoipa::path(
    get,
    path = "/lead_groups",
    responses(
        (status = 200, description = "Successfully retrieved all Lead Groups", body = [domain::lead_groups::Model]),
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
    debug!("GET all Lead Groups");

    let groups = LeadGroupApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), groups)))
}

/// POST create a new Lead Group
#[utoipa::path(
    post,
    path = "/lead_groups",
    request_body = domain::lead_groups::Model,
    responses(
        (status = 201, description = "Successfully created a new Lead Group", body = domain::lead_groups::Model),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Json(group_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Lead Group: {group_model:?}");

    let group = LeadGroupApi::create(app_state.db_conn_ref(), group_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), group)),
    ))
}

/// PUT rename a Lead Group or change its manager
#[utoipa::path(
    put,
    path = "/lead_groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead Group to update"),
    ),
    request_body = domain::lead_groups::Model,
    responses(
        (status = 200, description = "Successfully updated the Lead Group", body = domain::lead_groups::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead Group not found")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(group_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Lead Group with id: {id}");

    let group = LeadGroupApi::update(app_state.db_conn_ref(), id, group_model).await?;

    debug!("Updated Lead Group: {group:?}");

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), group)))
}

/// GET what deleting a Lead Group would remove: its lead count and a few lead names.
#[utoipa::path(
    get,
    path = "/lead_groups/{id}/deletion_preview",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead Group to preview"),
    ),
    responses(
        (status = 200, description = "The group with its lead count and sample lead names"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead Group not found")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn deletion_preview(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET deletion preview for Lead Group: {id}");

    let preview = LeadGroupApi::preview_deletion(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), preview)))
}

/// DELETE a Lead Group together with all of its leads
#[utoipa::path(
    delete,
    path = "/lead_groups/{id}",
    params(
        ("id" = Uuid, Path, description = "Lead Group id to delete")
    ),
    responses(
        (status = 200, description = "Deleted the group, returns the number of leads removed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead Group not found")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete(
    ActingUser(session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Lead Group {id} requested by {}", session.user_id);

    let deleted_leads = LeadGroupApi::delete(app_state.db_conn_ref(), id).await?;

    Ok(Json(json!({"id": id, "deleted_leads": deleted_leads})))
}
