use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::FieldValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    #[serde(rename = "_id")]
    pub id: String,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub class_id: Option<String>,
    pub class_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub date: String,
}

impl CheckIn {
    /// Builds a fresh record; `date` is always the UTC day of `timestamp`.
    pub fn new(req: NewCheckInRequest, at: DateTime<Utc>) -> Result<Self, AppError> {
        let student_id = req.student_id.and_then(FieldValue::into_identity);
        let student_name = req.student_name.and_then(FieldValue::into_identity);
        let class_id = req.class_id.and_then(FieldValue::into_identity);
        let class_name = req.class_name.and_then(FieldValue::into_identity);

        if student_id.is_none() && student_name.is_none() {
            return Err(AppError::InvalidArgument(
                "Student ID or name is required".to_string(),
            ));
        }
        if class_id.is_none() && class_name.is_none() {
            return Err(AppError::InvalidArgument(
                "Class ID or name is required".to_string(),
            ));
        }

        let timestamp = at.trunc_subsecs(3);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            student_id,
            student_name,
            class_id,
            class_name,
            date: calendar_day(timestamp),
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckInRequest {
    pub student_id: Option<FieldValue>,
    pub student_name: Option<FieldValue>,
    pub class_id: Option<FieldValue>,
    pub class_name: Option<FieldValue>,
}

/// Equality filters plus an inclusive day range. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckInFilter {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInQueryParams {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub date: Option<String>,
}

impl From<CheckInQueryParams> for CheckInFilter {
    fn from(params: CheckInQueryParams) -> Self {
        Self {
            student_id: non_empty(params.student_id),
            class_id: non_empty(params.class_id),
            date: non_empty(params.date),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQueryParams {
    pub student_id: Option<String>,
    pub class_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl From<StatsQueryParams> for CheckInFilter {
    fn from(params: StatsQueryParams) -> Self {
        Self {
            student_id: non_empty(params.student_id),
            class_id: non_empty(params.class_id),
            start_date: non_empty(params.start_date),
            end_date: non_empty(params.end_date),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub checkins: Vec<CheckIn>,
}

impl From<Vec<CheckIn>> for AttendanceStats {
    fn from(checkins: Vec<CheckIn>) -> Self {
        Self {
            total: checkins.len(),
            checkins,
        }
    }
}

pub fn calendar_day(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn request(student_id: &str, class_name: &str) -> NewCheckInRequest {
        NewCheckInRequest {
            student_id: Some(student_id.into()),
            class_name: Some(class_name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_date_is_utc_day_of_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 5, 31, 23, 59, 59).unwrap();
        let checkin = CheckIn::new(request("s1", "Math"), at).unwrap();

        assert_eq!(checkin.date, "2026-05-31");
        assert_eq!(checkin.timestamp, at);
        assert_eq!(checkin.student_name, None);
        assert_eq!(checkin.class_id, None);
    }

    #[test]
    fn test_timestamp_is_truncated_to_millis() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let checkin = CheckIn::new(request("s1", "Math"), at).unwrap();

        assert_eq!(checkin.timestamp.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_missing_student_identity() {
        let req = NewCheckInRequest {
            student_name: Some("".into()),
            student_id: Some(FieldValue::Integer(0)),
            class_id: Some("c1".into()),
            ..Default::default()
        };
        let err = CheckIn::new(req, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(msg) if msg.starts_with("Student")));
    }

    #[test]
    fn test_missing_class_identity() {
        let req = NewCheckInRequest {
            student_id: Some("s1".into()),
            class_name: Some(FieldValue::Bool(false)),
            ..Default::default()
        };
        let err = CheckIn::new(req, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(msg) if msg.starts_with("Class")));
    }

    #[test]
    fn test_scalar_identities_are_stored_as_text() {
        let req = NewCheckInRequest {
            student_id: Some(FieldValue::Integer(42)),
            class_id: Some(FieldValue::Float(2.5)),
            class_name: Some(FieldValue::Null),
            ..Default::default()
        };
        let checkin = CheckIn::new(req, Utc::now()).unwrap();

        assert_eq!(checkin.student_id.as_deref(), Some("42"));
        assert_eq!(checkin.class_id.as_deref(), Some("2.5"));
        assert_eq!(checkin.class_name, None);
    }

    #[test]
    fn test_serialized_shape() {
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        let checkin = CheckIn::new(request("s1", "Math"), at).unwrap();
        let value = serde_json::to_value(&checkin).unwrap();

        assert_eq!(value["studentId"], "s1");
        assert!(value["studentName"].is_null());
        assert!(value["classId"].is_null());
        assert_eq!(value["className"], "Math");
        assert_eq!(value["timestamp"], "2026-02-03T04:05:06Z");
        assert_eq!(value["date"], "2026-02-03");
        assert!(value["_id"].is_string());
    }

    #[test]
    fn test_empty_query_values_are_wildcards() {
        let filter = CheckInFilter::from(StatsQueryParams {
            student_id: Some(String::new()),
            class_id: Some("c1".to_string()),
            start_date: None,
            end_date: Some("2026-01-31".to_string()),
        });

        assert_eq!(filter.student_id, None);
        assert_eq!(filter.class_id.as_deref(), Some("c1"));
        assert_eq!(filter.end_date.as_deref(), Some("2026-01-31"));
    }
}
