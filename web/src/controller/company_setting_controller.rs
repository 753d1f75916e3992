use crate::controller::ApiResponse;
use crate::extractors::acting_user::{ActingUser, AdminUser};
use crate::params::company_setting::UpdateParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::company_setting as CompanySettingApi;
use log::*;

/// GET the company calling settings
#[utoipa::path(
    get,
    path = "/company_settings",
    responses(
        (status = 200, description = "The caller id and calling numbers", body = domain::company_settings::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Settings have not been saved yet")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn read(
    ActingUser(_session): ActingUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let settings = CompanySettingApi::get(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), settings)))
}

/// PUT replace the company calling settings
#[utoipa::path(
    put,
    path = "/company_settings",
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Settings saved", body = domain::company_settings::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins change calling settings"),
        (status = 422, description = "Blank calling number")
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn update(
    AdminUser(_admin): AdminUser,
    State(app_state): State<AppState>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT company settings: {params:?}");

    let settings = CompanySettingApi::upsert(
        app_state.db_conn_ref(),
        params.caller_id,
        params.from_numbers,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), settings)))
}
