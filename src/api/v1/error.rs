use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{
    InvalidQuery, LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType,
};
use warp::{Rejection, reject};

/// Turns every rejection into the JSON envelope. This is the only place a
/// [`UserNotFound`] becomes an HTTP response.
pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let failure = if let Some(failure) = err.find::<ApiFailure>() {
        failure.clone()
    } else if err.is_not_found() {
        ApiFailure::from(ApiErrorCode::RouteNotFound)
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        ApiFailure::new(ApiErrorCode::InvalidRequest, e.to_string())
    } else if let Some(e) = err.find::<InvalidQuery>() {
        ApiFailure::new(ApiErrorCode::InvalidRequest, e.to_string())
    } else if let Some(e) = err.find::<UnsupportedMediaType>() {
        ApiFailure::new(ApiErrorCode::InvalidRequest, e.to_string())
    } else if let Some(e) = err.find::<LengthRequired>() {
        ApiFailure::new(ApiErrorCode::InvalidRequest, e.to_string())
    } else if err.find::<PayloadTooLarge>().is_some() {
        ApiFailure::from(ApiErrorCode::PayloadTooLarge)
    } else if err.find::<MethodNotAllowed>().is_some() {
        ApiFailure::from(ApiErrorCode::MethodNotAllowed)
    } else {
        error!("Unhandled rejection: {:?}", err);
        ApiFailure::from(ApiErrorCode::InternalError)
    };

    let status = failure.code.status();
    debug!(%status, code = ?failure.code, message = %failure.message, "request failed");

    let json = warp::reply::json(&ApiResponse::<()>::err(failure.code, failure.message));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("User not found")]
    UserNotFound,
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Route not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::UserNotFound | ApiErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::UsernameTaken => StatusCode::CONFLICT,
            ApiErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

/// A code plus the message shown to the client.
#[derive(Debug, Clone, Error)]
#[error("{code:?}: {message}")]
pub struct ApiFailure {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiFailure {
            code,
            message: message.into(),
        }
    }
}

impl reject::Reject for ApiFailure {}

impl From<ApiErrorCode> for ApiFailure {
    fn from(code: ApiErrorCode) -> Self {
        ApiFailure::new(code, code.to_string())
    }
}

impl From<UserError> for ApiFailure {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound(signal) => {
                ApiFailure::new(ApiErrorCode::UserNotFound, signal.message())
            }
            UserError::UsernameTaken => ApiFailure::from(ApiErrorCode::UsernameTaken),
            e @ UserError::InvalidUsername(_) => {
                ApiFailure::new(ApiErrorCode::InvalidRequest, e.to_string())
            }
            UserError::Store(e) => ApiFailure::from(ApiErrorCode::internal(e)),
        }
    }
}
