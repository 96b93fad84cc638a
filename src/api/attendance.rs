use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{AppJson, AppQuery};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    AttendanceStats, CheckIn, CheckInFilter, CheckInQueryParams, NewCheckInRequest,
    StatsQueryParams,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub message: &'static str,
    pub id: String,
    pub checkin: CheckIn,
}

pub async fn check_in(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewCheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>), AppError> {
    let db = state.store()?;
    let checkin = CheckIn::new(req, Utc::now())?;

    match repository::insert_checkin(db, &checkin).await {
        Ok(()) => {}
        // Same student, class and day already recorded.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            warn!(
                student_id = ?checkin.student_id,
                class_id = ?checkin.class_id,
                date = %checkin.date,
                "duplicate check-in rejected"
            );
            return Err(AppError::Conflict(
                "Student has already checked in to this class today".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }
    info!("check-in {} recorded for {}", checkin.id, checkin.date);

    Ok((
        StatusCode::CREATED,
        Json(CheckInResponse {
            message: "Check-in successful",
            id: checkin.id.clone(),
            checkin,
        }),
    ))
}

pub async fn list_checkins(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CheckInQueryParams>,
) -> Result<Json<Vec<CheckIn>>, AppError> {
    let filter = CheckInFilter::from(params);
    let checkins = repository::fetch_checkins(state.store()?, &filter).await?;
    Ok(Json(checkins))
}

pub async fn stats(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<StatsQueryParams>,
) -> Result<Json<AttendanceStats>, AppError> {
    let filter = CheckInFilter::from(params);
    let checkins = repository::fetch_checkins(state.store()?, &filter).await?;
    Ok(Json(AttendanceStats::from(checkins)))
}
