use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind, RuleErrorKind,
};
use log::*;
use sse::error::{Error as SseError, SseErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    /// Opening an event stream failed.
    Stream(SseError),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Domain(domain_error) => domain_error_response(domain_error),
            Error::Stream(sse_error) => match sse_error.error_kind {
                SseErrorKind::ConnectionLimit { topic, limit } => {
                    warn!("Refusing SSE connection on {topic}: limit of {limit} reached");
                    (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE").into_response()
                }
                _ => {
                    error!("SSE error: {sse_error}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

fn domain_error_response(domain_error: DomainError) -> Response {
    match domain_error.error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
                EntityErrorKind::Invalid => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                }
                EntityErrorKind::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
                }
                EntityErrorKind::AlreadyExists => {
                    (StatusCode::CONFLICT, "CONFLICT").into_response()
                }
                EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                    error!("Entity error: {:?}", domain_error.source);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            InternalErrorKind::Other(reason) => {
                error!("Internal error: {reason}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        },
        DomainErrorKind::Rule(rule_error_kind) => match rule_error_kind {
            RuleErrorKind::Invalid(reason) => {
                (StatusCode::UNPROCESSABLE_ENTITY, reason).into_response()
            }
            RuleErrorKind::Conflict(reason) => (StatusCode::CONFLICT, reason).into_response(),
            RuleErrorKind::Forbidden(reason) => (StatusCode::FORBIDDEN, reason).into_response(),
        },
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_errors_map_to_their_status_codes() {
        assert_eq!(
            Error::from(DomainError::conflict("closed")).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::from(DomainError::forbidden("seller only"))
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::from(DomainError::invalid("too low"))
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn connection_limit_is_service_unavailable() {
        let err = Error::Stream(SseError {
            source: None,
            error_kind: SseErrorKind::ConnectionLimit {
                topic: "auction-1".to_string(),
                limit: 2,
            },
        });

        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
