use crate::controller::ApiResponse;
use crate::extractors::acting_user::{ActingUser, AdminUser};
use crate::params::lead::{
    AssignmentParams, BulkDeleteParams, CreateParams, ImportParams, IndexParams, RemovalParams,
    UpdateParams,
};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::lead::AssignmentTarget;
use domain::session::Role;
use domain::{call as CallApi, follow_up as FollowUpApi, lead as LeadApi, Id, IntoUpdateMap};
use log::*;
use serde_json::json;

/// GET Leads matching the given filters, newest first
#[utoipa::path(
    get,
    path = "/leads",
    params(IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved Leads", body = [domain::leads::Model]),
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
    debug!("GET Leads with params: {params:?}");

    let leads = LeadApi::find_by(app_state.db_conn_ref(), params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), leads)))
}

/// POST create a Lead, assigned through a group or directly to a manager
#[utoipa::path(
    post,
    path = "/leads",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new Lead", body = domain::leads::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Group or manager not found"),
        (status = 422, description = "Missing fields or no usable assignment")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Lead: {params:?}");

    let (new_lead, target) = params.into_parts();
    let lead = LeadApi::assign_lead(app_state.db_conn_ref(), new_lead, target).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), lead)),
    ))
}

/// POST import Leads from CSV text. All rows share one assignment.
#[utoipa::path(
    post,
    path = "/leads/import",
    request_body = ImportParams,
    responses(
        (status = 201, description = "Every row was imported", body = [domain::leads::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Malformed CSV or no usable assignment")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn import(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Json(params): Json<ImportParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST import Leads ({} bytes of CSV)", params.csv.len());

    let target = AssignmentTarget {
        group_id: params.group_id,
        manager_id: params.manager_id,
    };
    let leads = LeadApi::import_csv(app_state.db_conn_ref(), &params.csv, target).await?;

    info!("Imported {} lead(s)", leads.len());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), leads)),
    ))
}

/// PUT update a Lead's contact details or working employee
#[utoipa::path(
    put,
    path = "/leads/{id}",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead to update"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the Lead", body = domain::leads::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Lead {id} with params: {params:?}");

    let lead = LeadApi::update(app_state.db_conn_ref(), id, params.into_update_map()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), lead)))
}

/// PUT move a Lead to another group or manager
#[utoipa::path(
    put,
    path = "/leads/{id}/assignment",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead to reassign"),
    ),
    request_body = AssignmentParams,
    responses(
        (status = 200, description = "Successfully reassigned the Lead", body = domain::leads::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead, group or manager not found"),
        (status = 422, description = "No usable assignment")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn assignment(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<AssignmentParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT reassign Lead {id}: {params:?}");

    let lead = LeadApi::reassign(app_state.db_conn_ref(), id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), lead)))
}

/// POST remove a Lead from the working set, keeping a snapshot and the reason
#[utoipa::path(
    post,
    path = "/leads/{id}/removal",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead to remove"),
    ),
    request_body = RemovalParams,
    responses(
        (status = 200, description = "Lead marked as removed", body = domain::leads::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "A reason is required")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn removal(
    ActingUser(session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<RemovalParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST remove Lead {id}");

    let employee_id = match session.role {
        Role::Employee => Some(session.user_id),
        _ => None,
    };
    let lead = LeadApi::remove(app_state.db_conn_ref(), id, employee_id, &params.reason).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), lead)))
}

/// POST permanently delete several Leads at once
#[utoipa::path(
    post,
    path = "/leads/bulk_delete",
    request_body = BulkDeleteParams,
    responses(
        (status = 200, description = "Returns how many Leads were deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins may delete leads")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn bulk_delete(
    AdminUser(_admin): AdminUser,
    State(app_state): State<AppState>,
    Json(params): Json<BulkDeleteParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST bulk delete {} Lead(s)", params.ids.len());

    let deleted = LeadApi::bulk_delete(app_state.db_conn_ref(), params.ids).await?;

    Ok(Json(json!({"deleted": deleted})))
}

/// GET the colour-coded indicator derived from a Lead's latest call
#[utoipa::path(
    get,
    path = "/leads/{id}/status_indicator",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead"),
    ),
    responses(
        (status = 200, description = "The indicator for the Lead's latest call"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn status_indicator(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET status indicator for Lead {id}");

    let indicator = CallApi::status_indicator(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), indicator)))
}

/// GET a Lead's call history, newest first
#[utoipa::path(
    get,
    path = "/leads/{id}/calls",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the Lead's calls", body = [domain::calls::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn calls(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET calls for Lead {id}");

    let calls = CallApi::find_by_lead_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), calls)))
}

/// DELETE a Lead's pending follow-up and put it back to active
#[utoipa::path(
    delete,
    path = "/leads/{id}/follow_up",
    params(
        ("id" = Uuid, Path, description = "Id of the Lead"),
    ),
    responses(
        (status = 200, description = "Follow-up removed", body = domain::leads::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete_follow_up(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE follow-up for Lead {id}");

    let lead = FollowUpApi::delete_follow_up(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), lead)))
}
