pub(crate) mod acting_user;
pub(crate) mod webhook_secret;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
