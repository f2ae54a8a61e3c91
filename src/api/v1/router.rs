use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

/// Max accepted JSON body size for `POST /users`.
const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    // Path before method, so an unknown path is a 404 rather than a 405.
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with(server.user_service.clone()))
        .and_then(handler::health);

    let get_user = warp::path!("users" / String)
        .and(warp::get())
        .and(with(server.user_service.clone()))
        .and_then(handler::get_user);

    let find_user = warp::path("users")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handler::UserLookupQuery>())
        .and(with(server.user_service.clone()))
        .and_then(handler::find_user);

    let create_user = warp::path("users")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::create_user);

    health.or(get_user).or(find_user).or(create_user)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
