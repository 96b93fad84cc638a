use sqlx::SqlitePool;

use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub database_name: String,
}

impl AppState {
    pub fn new(db: SqlitePool, database_name: impl Into<String>) -> Self {
        Self {
            db,
            database_name: database_name.into(),
        }
    }

    /// The shared pool, or `Unavailable` once it has been closed.
    pub fn store(&self) -> Result<&SqlitePool, AppError> {
        if self.db.is_closed() {
            return Err(AppError::Unavailable);
        }
        Ok(&self.db)
    }
}
