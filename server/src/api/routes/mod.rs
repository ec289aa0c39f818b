//! API route handlers

pub mod auth;
pub mod health;
pub mod listing;

use axum::Router;
use axum::routing::{get, post};

use super::server::AppState;

/// Assemble the `/api/v1` route tree
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/token", post(auth::issue_token))
        .route("/meta/filters/{kind}", get(listing::filter_meta))
        .route("/coaches", get(listing::list_coaches))
        .route("/lessons", get(listing::list_lessons))
        .route("/subscription-types", get(listing::list_subscription_types))
        .route("/timetable", get(listing::list_timetable))
        .route(
            "/client-subscriptions",
            get(listing::list_client_subscriptions),
        )
        .route("/attendance", get(listing::list_attendance))
        .route("/users", get(listing::list_users))
}
