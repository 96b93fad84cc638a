use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys owned by the service; never taken from a submitted body.
pub const RESERVED_KEYS: [&str; 3] = ["_id", "createdAt", "updatedAt"];

/// A single submitted value. Nested arrays and objects are not accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text form of a truthy value; null, `false`, zero and `""` count as absent.
    pub fn into_identity(self) -> Option<String> {
        match self {
            FieldValue::Null | FieldValue::Bool(false) | FieldValue::Integer(0) => None,
            FieldValue::Unsigned(0) => None,
            FieldValue::Float(f) if f == 0.0 || f.is_nan() => None,
            FieldValue::Bool(true) => Some("true".to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Unsigned(n) => Some(n.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Text(s) if s.is_empty() => None,
            FieldValue::Text(s) => Some(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

pub type Fields = IndexMap<String, FieldValue>;

/// A student or class record: the submitted field bag plus the stamps the
/// service adds at creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: String, mut fields: Fields, now: DateTime<Utc>) -> Self {
        fields.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        Self {
            id,
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}

pub type Student = Document;
pub type Class = Document;

/// The collections holding field-bag documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Students,
    Classes,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Classes => "classes",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQueryParams {
    pub phone_number: Option<String>,
}

/// Digits of a phone search term; stored numbers are compared as-is.
pub fn phone_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_scalar_fields_parse_in_order() {
        let fields: Fields = serde_json::from_value(json!({
            "name": "Ana",
            "age": 12,
            "gpa": 3.5,
            "active": true,
            "nickname": null
        }))
        .expect("scalar bag should parse");

        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "age", "gpa", "active", "nickname"]);
        assert_eq!(fields["age"], FieldValue::Integer(12));
        assert_eq!(fields["gpa"], FieldValue::Float(3.5));
        assert_eq!(fields["nickname"], FieldValue::Null);
    }

    #[test]
    fn test_large_unsigned_keeps_precision() {
        let fields: Fields = serde_json::from_value(json!({
            "badge": 18446744073709551615u64,
            "offset": -5
        }))
        .unwrap();

        assert_eq!(fields["badge"], FieldValue::Unsigned(u64::MAX));
        assert_eq!(fields["offset"], FieldValue::Integer(-5));
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"badge":18446744073709551615,"offset":-5}"#
        );
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let parsed = serde_json::from_value::<Fields>(json!({ "tags": ["a", "b"] }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_reserved_keys_are_dropped() {
        let fields: Fields = serde_json::from_value(json!({
            "_id": "spoofed",
            "name": "Ana",
            "createdAt": "1999-01-01"
        }))
        .unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap();

        let doc = Document::new("abc".to_string(), fields, now);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["_id"], "abc");
        assert_eq!(value["name"], "Ana");
        assert_eq!(value["createdAt"], "2026-03-02T08:30:00Z");
        assert_eq!(value["updatedAt"], "2026-03-02T08:30:00Z");
    }

    #[test]
    fn test_phone_digits() {
        assert_eq!(phone_digits("555-1234"), "5551234");
        assert_eq!(phone_digits("(+1) 555 12 34"), "15551234");
        assert_eq!(phone_digits("call me"), "");
    }
}
