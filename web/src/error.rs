use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    AssignmentErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError,
    ExternalErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND".to_string()),
                    EntityErrorKind::Invalid => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "UNPROCESSABLE ENTITY".to_string(),
                    ),
                    EntityErrorKind::UniqueConstraint => {
                        (StatusCode::CONFLICT, "Record already exists".to_string())
                    }
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL SERVER ERROR".to_string(),
                    ),
                },
                InternalErrorKind::Validation(message) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, message.clone())
                }
                InternalErrorKind::Assignment(AssignmentErrorKind::UnassignedGroup) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The selected group has no manager assigned".to_string(),
                ),
                InternalErrorKind::Assignment(AssignmentErrorKind::NoAssignment) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Select a group or a manager for the lead".to_string(),
                ),
                InternalErrorKind::NoRecording => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The call has no recording to analyze".to_string(),
                ),
                InternalErrorKind::Config | InternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".to_string(),
                ),
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => (StatusCode::BAD_GATEWAY, "BAD GATEWAY".to_string()),
                ExternalErrorKind::Other(message) => (StatusCode::BAD_GATEWAY, message.clone()),
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        } else {
            debug!("Request rejected ({status}): {message}");
        }
        (status, message).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
