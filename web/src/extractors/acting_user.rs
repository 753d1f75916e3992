use crate::extractors::RejectionType;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use domain::session::{Role, Session};
use log::*;

/// Header carrying the token returned by `POST /session`.
pub(crate) const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// The signed-in user making the request, resolved through the session store.
pub(crate) struct ActingUser(pub Session);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))?;

        match state.session_store.load_session(token).await {
            Ok(Some(session)) => Ok(ActingUser(session)),
            Ok(None) => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
            Err(e) => {
                error!("Failed to load session: {e}");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".to_string(),
                ))
            }
        }
    }
}

/// An `ActingUser` signed in as admin.
pub(crate) struct AdminUser(pub Session);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ActingUser(session) = ActingUser::from_request_parts(parts, state).await?;
        match session.role {
            Role::Admin => Ok(AdminUser(session)),
            _ => {
                warn!("{:?} {} attempted an admin action", session.role, session.user_id);
                Err((StatusCode::FORBIDDEN, "Forbidden".to_string()))
            }
        }
    }
}

/// An `ActingUser` signed in as an employee; only employees place and record calls.
pub(crate) struct EmployeeUser(pub Session);

impl FromRequestParts<AppState> for EmployeeUser {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ActingUser(session) = ActingUser::from_request_parts(parts, state).await?;
        match session.role {
            Role::Employee => Ok(EmployeeUser(session)),
            _ => Err((
                StatusCode::FORBIDDEN,
                "Only employees can place calls".to_string(),
            )),
        }
    }
}
