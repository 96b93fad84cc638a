use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::{AppJson, AppPath, AppQuery};
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Collection, Fields, Student, StudentQueryParams, phone_digits};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedStudent {
    pub message: &'static str,
    pub id: String,
    pub student: Student,
}

pub async fn list_students(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<StudentQueryParams>,
) -> Result<Json<Vec<Student>>, AppError> {
    let db = state.store()?;
    let students = match params.phone_number.filter(|p| !p.is_empty()) {
        Some(phone) => repository::fetch_students_by_phone(db, &phone_digits(&phone)).await?,
        None => repository::fetch_documents(db, Collection::Students).await?,
    };
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<AppState>,
    AppJson(fields): AppJson<Fields>,
) -> Result<(StatusCode, Json<CreatedStudent>), AppError> {
    let student = repository::insert_document(state.store()?, Collection::Students, fields).await?;
    info!("created student {}", student.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedStudent {
            message: "Student created successfully",
            id: student.id.clone(),
            student,
        }),
    ))
}

pub async fn get_student(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> Result<Json<Student>, AppError> {
    let db = state.store()?;
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::InvalidArgument(format!("Invalid student id: {}", id)))?;

    let student = repository::find_document(db, Collection::Students, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
    Ok(Json(student))
}
