use crate::extractors::RejectionType;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;

/// Header the analysis service signs its result callbacks with.
pub(crate) const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Admits requests carrying the configured analysis webhook secret.
pub(crate) struct WebhookSecret;

impl FromRequestParts<AppState> for WebhookSecret {
    type Rejection = RejectionType;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config().analysis_webhook_secret() else {
            warn!("Rejected analysis callback: ANALYSIS_WEBHOOK_SECRET is not configured");
            return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
        };

        let provided = parts
            .headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(secret) if secret == expected => Ok(WebhookSecret),
            _ => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
        }
    }
}
