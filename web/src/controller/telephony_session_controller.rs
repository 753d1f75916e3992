use crate::controller::ApiResponse;
use crate::extractors::acting_user::{ActingUser, EmployeeUser};
use crate::params::telephony_session::CreateParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::error::Error as DomainError;
use domain::telephony::{self as TelephonyApi, CallTarget, SessionState};
use domain::{lead as LeadApi, Id};
use log::*;
use serde_json::json;
use tokio::sync::watch;

/// POST dial a Lead.
///
/// The provider is asked to place the call before this returns. The session then
/// runs in the background; poll `GET /telephony_sessions/{id}` for its state.
#[utoipa::path(
    post,
    path = "/telephony_sessions",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Call placed, data carries the session id and state"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only employees place calls"),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Numbers or calling settings are invalid"),
        (status = 500, description = "Telephony is not configured"),
        (status = 502, description = "The telephony provider rejected or never answered")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn create(
    EmployeeUser(session): EmployeeUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST dial Lead {} from {}", params.lead_id, params.from);

    let provider = app_state.telephony_provider()?;
    LeadApi::find_by_id(app_state.db_conn_ref(), params.lead_id).await?;

    let response = TelephonyApi::initiate(
        app_state.db_conn_ref(),
        provider.as_ref(),
        &params.from,
        &params.to,
    )
    .await?;

    let target = CallTarget {
        lead_id: params.lead_id,
        employee_id: session.user_id,
        from: params.from.trim().to_owned(),
        to: params.to.trim().to_owned(),
    };
    let (state_tx, state_rx) = watch::channel(SessionState::Initiating);
    let cancel = app_state.shutdown.child_token();
    let session_id = app_state
        .telephony_sessions
        .register(state_rx, cancel.clone());

    tokio::spawn(TelephonyApi::run_session(
        app_state.database(),
        provider,
        target,
        response.sid.clone(),
        app_state.config().telephony_poll_interval(),
        cancel,
        state_tx,
    ));

    info!("Telephony session {session_id} started for call {}", response.sid);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            StatusCode::CREATED.into(),
            json!({"id": session_id, "sid": response.sid, "state": SessionState::Initiating}),
        )),
    ))
}

/// GET the current state of a telephony session
#[utoipa::path(
    get,
    path = "/telephony_sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Telephony session id"),
    ),
    responses(
        (status = 200, description = "The session's current state"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown or cancelled session")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn read(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let state = app_state
        .telephony_sessions
        .state(id)
        .ok_or_else(DomainError::not_found)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), state)))
}

/// DELETE stop polling a telephony session and forget it.
///
/// The call itself is not hung up. A finished session is simply discarded.
#[utoipa::path(
    delete,
    path = "/telephony_sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Telephony session id"),
    ),
    responses(
        (status = 200, description = "Session stopped, data carries its last state"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown session")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE telephony session {id}");

    let last_state = app_state
        .telephony_sessions
        .cancel(id)
        .ok_or_else(DomainError::not_found)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), last_state)))
}
