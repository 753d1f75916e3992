use crate::controller::ApiResponse;
use crate::extractors::{acting_user::ActingUser, webhook_secret::WebhookSecret};
use crate::params::analysis::ResultParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{analysis as AnalysisApi, Id};
use log::*;

/// GET every analysis job, most recently updated first
#[utoipa::path(
    get,
    path = "/analyses",
    responses(
        (status = 200, description = "Successfully retrieved all analyses", body = [domain::analyses::Model]),
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
    debug!("GET all analyses");

    let analyses = AnalysisApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), analyses)))
}

/// PUT the analysis service's result for a job it was sent.
///
/// Callers authenticate with the shared `x-webhook-secret` header rather than a session.
#[utoipa::path(
    put,
    path = "/analyses/{id}/result",
    params(
        ("id" = Uuid, Path, description = "Id of the analysis job"),
    ),
    request_body = ResultParams,
    responses(
        (status = 200, description = "Result stored", body = domain::analyses::Model),
        (status = 401, description = "Wrong webhook secret"),
        (status = 403, description = "No webhook secret is configured"),
        (status = 404, description = "Analysis not found"),
        (status = 422, description = "Scores out of range or the job already finished")
    ),
    security(
        ("webhook_secret" = [])
    )
)]
pub async fn result(
    _secret: WebhookSecret,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<ResultParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT result for analysis {id}: {:?}", params.status);

    let analysis = AnalysisApi::record_result(app_state.db_conn_ref(), id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), analysis)))
}
