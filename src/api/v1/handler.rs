use super::error::*;
use crate::application_port::UserService;
use crate::domain_model::{NewUser, User, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub users: u64,
}

pub async fn health(
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let users = user_service
        .count_users()
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(HealthResponse {
        status: "ok",
        users,
    })))
}

/// `user_id` is the raw path segment; it is percent-decoded before lookup.
pub async fn get_user(
    user_id: String,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = urlencoding::decode(&user_id)
        .map_err(|e| {
            ApiFailure::new(ApiErrorCode::InvalidRequest, format!("invalid user id: {e}"))
        })
        .map_err(reject::custom)?
        .into_owned();

    let user = user_service
        .get_user(&UserId(user_id))
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct UserLookupQuery {
    pub username: String,
}

pub async fn find_user(
    query: UserLookupQuery,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .resolve_username(&query.username)
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

pub async fn create_user(
    body: CreateUserRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user: User = user_service
        .create_user(NewUser {
            username: body.username,
        })
        .await
        .map_err(ApiFailure::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(user)),
        StatusCode::CREATED,
    ))
}
