use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::info;

use crate::api::AppJson;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{Class, Collection, Fields};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedClass {
    pub message: &'static str,
    pub id: String,
    pub class: Class,
}

pub async fn list_classes(State(state): State<AppState>) -> Result<Json<Vec<Class>>, AppError> {
    let classes = repository::fetch_documents(state.store()?, Collection::Classes).await?;
    Ok(Json(classes))
}

pub async fn create_class(
    State(state): State<AppState>,
    AppJson(fields): AppJson<Fields>,
) -> Result<(StatusCode, Json<CreatedClass>), AppError> {
    let class = repository::insert_document(state.store()?, Collection::Classes, fields).await?;
    info!("created class {}", class.id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedClass {
            message: "Class created successfully",
            id: class.id.clone(),
            class,
        }),
    ))
}
