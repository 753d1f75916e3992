use crate::controller::ApiResponse;
use crate::extractors::acting_user::ActingUser;
use crate::params::session::LoginParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::session as SessionApi;
use log::*;

/// Opens a session for a role and returns its token.
///
/// Every other endpoint expects the token back in the `x-session-token` header, e.g.:
/// curl --header "x-session-token: 6f1c..." http://localhost:4000/leads
#[utoipa::path(
    post,
    path = "/session",
    request_body = LoginParams,
    responses(
        (status = 201, description = "Session opened, data carries the token"),
        (status = 404, description = "No manager or employee with that id"),
        (status = 422, description = "Unprocessable Entity")
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST open a {:?} session for {}", params.role, params.user_id);

    let session = SessionApi::open(
        app_state.db_conn_ref(),
        app_state.session_store.as_ref(),
        params.role,
        params.user_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), session)),
    ))
}

/// GET the session the request's token belongs to
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "The current session"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn read(ActingUser(session): ActingUser) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(StatusCode::OK.into(), session)))
}

/// Signs out, forgetting the session token.
#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 204, description = "Session cleared"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn delete(
    ActingUser(session): ActingUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE session for {}", session.user_id);

    app_state.session_store.clear_session(&session.token).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
