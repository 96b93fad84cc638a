mod attendance;
mod classes;
mod health;
mod students;

use axum::extract::{FromRequest, FromRequestParts};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

// Extractors whose rejections use the service's `{error, message}` body.

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/test-db", get(health::test_db))
        .route("/students", get(students::list_students).post(students::create_student))
        .route("/students/{id}", get(students::get_student))
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route("/checkin", post(attendance::check_in))
        .route("/checkins", get(attendance::list_checkins))
        .route("/attendance/stats", get(attendance::stats));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
