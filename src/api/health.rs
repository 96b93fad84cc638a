use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub database: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "RollTrack API is running",
        timestamp: Utc::now(),
    })
}

pub async fn test_db(State(state): State<AppState>) -> Result<Json<DatabaseStatus>, AppError> {
    db::ping(state.store()?).await.inspect_err(|e| {
        error!("database ping failed: {}", e);
    })?;

    Ok(Json(DatabaseStatus {
        status: "connected",
        message: "Database connection is active",
        database: state.database_name.clone(),
    }))
}
