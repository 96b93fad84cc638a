use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{CheckIn, CheckInFilter, Collection, Document, Fields, Student};

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    data: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = sqlx::Error;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let fields: Fields =
            serde_json::from_str(&row.data).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Document {
            id: row.id,
            fields,
            created_at: parse_instant(&row.created_at)?,
            updated_at: parse_instant(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct CheckInRow {
    id: String,
    student_id: Option<String>,
    student_name: Option<String>,
    class_id: Option<String>,
    class_name: Option<String>,
    timestamp: String,
    date: String,
}

impl TryFrom<CheckInRow> for CheckIn {
    type Error = sqlx::Error;

    fn try_from(row: CheckInRow) -> Result<Self, Self::Error> {
        Ok(CheckIn {
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_name,
            class_id: row.class_id,
            class_name: row.class_name,
            timestamp: parse_instant(&row.timestamp)?,
            date: row.date,
        })
    }
}

// Fixed-width millisecond form, so text order equals time order.
fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn into_documents(rows: Vec<DocumentRow>) -> Result<Vec<Document>, sqlx::Error> {
    rows.into_iter().map(Document::try_from).collect()
}

pub async fn fetch_documents(
    db: &SqlitePool,
    collection: Collection,
) -> Result<Vec<Document>, sqlx::Error> {
    let sql = format!(
        "SELECT id, data, created_at, updated_at FROM {} ORDER BY rowid",
        collection.table()
    );
    let rows = sqlx::query_as::<_, DocumentRow>(&sql).fetch_all(db).await?;
    into_documents(rows)
}

/// Students whose stored `phoneNumber` string contains `digits`.
pub async fn fetch_students_by_phone(
    db: &SqlitePool,
    digits: &str,
) -> Result<Vec<Student>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        r#"
        SELECT id, data, created_at, updated_at
        FROM students
        WHERE json_type(data, '$.phoneNumber') = 'text'
          AND instr(lower(json_extract(data, '$.phoneNumber')), lower(?1)) > 0
        ORDER BY rowid
        "#,
    )
    .bind(digits)
    .fetch_all(db)
    .await?;
    into_documents(rows)
}

pub async fn insert_document(
    db: &SqlitePool,
    collection: Collection,
    fields: Fields,
) -> Result<Document, sqlx::Error> {
    let document = Document::new(Uuid::new_v4().to_string(), fields, Utc::now().trunc_subsecs(3));
    let data = serde_json::to_string(&document.fields)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let sql = format!(
        "INSERT INTO {} (id, data, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        collection.table()
    );
    sqlx::query(&sql)
        .bind(&document.id)
        .bind(data)
        .bind(format_instant(document.created_at))
        .bind(format_instant(document.updated_at))
        .execute(db)
        .await?;

    Ok(document)
}

pub async fn find_document(
    db: &SqlitePool,
    collection: Collection,
    id: &Uuid,
) -> Result<Option<Document>, sqlx::Error> {
    let sql = format!(
        "SELECT id, data, created_at, updated_at FROM {} WHERE id = ?1",
        collection.table()
    );
    sqlx::query_as::<_, DocumentRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .map(Document::try_from)
        .transpose()
}

/// Relies on the `attendance_once_per_day` unique index; a repeat surfaces as
/// a database error whose `is_unique_violation()` is true.
pub async fn insert_checkin(db: &SqlitePool, checkin: &CheckIn) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO attendance
            (id, student_id, student_name, class_id, class_name, timestamp, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&checkin.id)
    .bind(&checkin.student_id)
    .bind(&checkin.student_name)
    .bind(&checkin.class_id)
    .bind(&checkin.class_name)
    .bind(format_instant(checkin.timestamp))
    .bind(&checkin.date)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn fetch_checkins(
    db: &SqlitePool,
    filter: &CheckInFilter,
) -> Result<Vec<CheckIn>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, student_id, student_name, class_id, class_name, timestamp, date \
         FROM attendance WHERE 1 = 1",
    );

    if let Some(student_id) = &filter.student_id {
        query.push(" AND student_id = ").push_bind(student_id.clone());
    }
    if let Some(class_id) = &filter.class_id {
        query.push(" AND class_id = ").push_bind(class_id.clone());
    }
    if let Some(date) = &filter.date {
        query.push(" AND date = ").push_bind(date.clone());
    }
    if let Some(start) = &filter.start_date {
        query.push(" AND date >= ").push_bind(start.clone());
    }
    if let Some(end) = &filter.end_date {
        query.push(" AND date <= ").push_bind(end.clone());
    }
    query.push(" ORDER BY timestamp DESC, rowid DESC");

    query
        .build_query_as::<CheckInRow>()
        .fetch_all(db)
        .await?
        .into_iter()
        .map(CheckIn::try_from)
        .collect()
}
