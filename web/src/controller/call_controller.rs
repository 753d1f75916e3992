use crate::controller::ApiResponse;
use crate::extractors::acting_user::{ActingUser, EmployeeUser};
use crate::params::call::{ClassificationParams, CreateParams};
use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use domain::analysis::Submission;
use domain::error::Error as DomainError;
use domain::follow_up::{self as FollowUpApi, Countdown};
use domain::{call as CallApi, Id};
use futures_util::stream::Stream;
use log::*;
use serde_json::json;
use std::convert::Infallible;

/// POST record a call an employee made to a Lead, with its outcome form
#[utoipa::path(
    post,
    path = "/calls",
    request_body = CreateParams,
    responses(
        (status = 201, description = "Call recorded and Lead status updated", body = domain::calls::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only employees record calls"),
        (status = 404, description = "Lead not found"),
        (status = 422, description = "Missing notes or an invalid follow-up")
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
    debug!("POST record a call on Lead {}: {params:?}", params.lead_id);

    let call = CallApi::record_call(
        app_state.db_conn_ref(),
        params.lead_id,
        session.user_id,
        params.classification.into(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), call)),
    ))
}

/// PUT fill in the outcome form of a call placed through a telephony session
#[utoipa::path(
    put,
    path = "/calls/{id}/classification",
    params(
        ("id" = Uuid, Path, description = "Id of the call to classify"),
    ),
    request_body = ClassificationParams,
    responses(
        (status = 200, description = "Call classified and Lead status updated", body = domain::calls::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call not found"),
        (status = 422, description = "Missing notes or an invalid follow-up")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn classification(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<ClassificationParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT classify call {id}: {params:?}");

    let call = CallApi::classify_call(app_state.db_conn_ref(), id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), call)))
}

/// DELETE a call and any analysis of it
#[utoipa::path(
    delete,
    path = "/calls/{id}",
    params(
        ("id" = Uuid, Path, description = "Call id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the call"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call not found")
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
    debug!("DELETE call by id: {id}");

    CallApi::delete(app_state.db_conn_ref(), id).await?;
    Ok(Json(json!({"id": id})))
}

/// GET the time left until a call's scheduled follow-up
#[utoipa::path(
    get,
    path = "/calls/{id}/countdown",
    params(
        ("id" = Uuid, Path, description = "Id of a call with a follow-up"),
    ),
    responses(
        (status = 200, description = "Days, hours, minutes and seconds left, or overdue"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call not found"),
        (status = 422, description = "The call has no follow-up scheduled")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn countdown(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let next_follow_up = find_follow_up(&app_state, id).await?;
    let countdown = Countdown::between(next_follow_up, Utc::now());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), countdown)))
}

/// GET a live countdown to a call's follow-up, one server-sent event per second
#[utoipa::path(
    get,
    path = "/calls/{id}/countdown/stream",
    params(
        ("id" = Uuid, Path, description = "Id of a call with a follow-up"),
    ),
    responses(
        (status = 200, description = "text/event-stream of countdowns"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call not found"),
        (status = 422, description = "The call has no follow-up scheduled")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn countdown_stream(
    ActingUser(session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let next_follow_up = find_follow_up(&app_state, id).await?;
    debug!("Streaming follow-up countdown for call {id} to {}", session.user_id);

    let cancel = app_state.shutdown.child_token();
    let mut countdown = FollowUpApi::watch_countdown(next_follow_up, cancel.clone());

    let stream = stream! {
        // Stops the ticker once the client goes away
        let _ticker = cancel.drop_guard();
        loop {
            let current = *countdown.borrow_and_update();
            match Event::default().json_data(current) {
                Ok(event) => yield Ok::<Event, Infallible>(event),
                Err(e) => {
                    warn!("Failed to encode countdown for call {id}: {e}");
                    break;
                }
            }
            if countdown.changed().await.is_err() {
                break;
            }
        }
        debug!("Countdown stream for call {id} closed");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn find_follow_up(app_state: &AppState, call_id: Id) -> Result<DateTime<Utc>, Error> {
    let call = CallApi::find_by_id(app_state.db_conn_ref(), call_id).await?;
    let next_follow_up = call
        .next_follow_up
        .ok_or_else(|| DomainError::validation("The call has no follow-up scheduled"))?;

    Ok(next_follow_up.with_timezone(&Utc))
}

/// GET follow-up calls set to auto-dial whose time has come
#[utoipa::path(
    get,
    path = "/calls/due_auto_calls",
    responses(
        (status = 200, description = "Due auto-dial follow-ups, oldest first", body = [domain::calls::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn due_auto_calls(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET due auto-dial follow-ups");

    let calls = CallApi::find_due_auto_calls(app_state.db_conn_ref(), Utc::now()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), calls)))
}

/// POST ask for a call's recording to be analyzed.
///
/// Answers 202 once the job is written; the analysis itself arrives later through
/// `PUT /analyses/{id}/result`. A call already being analyzed answers 200 with the
/// existing job.
#[utoipa::path(
    post,
    path = "/calls/{id}/analysis",
    params(
        ("id" = Uuid, Path, description = "Id of the call to analyze"),
    ),
    responses(
        (status = 200, description = "Already being analyzed", body = domain::analyses::Model),
        (status = 202, description = "Analysis started", body = domain::analyses::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Call not found"),
        (status = 422, description = "The call has no recording"),
        (status = 500, description = "Analysis is not configured")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn analyze(
    ActingUser(session): ActingUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST analyze call {id} for {}", session.user_id);

    let coordinator = app_state.coordinator()?;
    let submission = coordinator.submit(app_state.db_conn_ref(), id).await?;

    let status = match submission {
        Submission::Started(_) => StatusCode::ACCEPTED,
        Submission::AlreadyAnalyzing(_) => StatusCode::OK,
    };

    Ok((
        status,
        Json(ApiResponse::new(status.into(), submission.analysis().clone())),
    ))
}
