//! Row validator
//!
//! Validation semantics:
//! - Row data must be an object
//! - Keys must name existing columns (or are dropped, per policy)
//! - Required columns must be present
//! - Values must satisfy their column type; nulls are never accepted
//!
//! Validation is all-or-nothing: the first violation aborts the call and no
//! partial row is returned.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::{SchemaError, SchemaResult, ValidationDetails};
use super::types::{Column, ColumnType, RowData};

/// What to do with row keys that name no column of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Fail validation, naming the unknown key
    #[default]
    Reject,
    /// Remove the key from the normalized row
    Drop,
}

/// Checks one present, non-null value and returns its normalized form.
///
/// On failure returns `(expected, actual)` for the error details.
type FieldCheck = fn(&Column, &Value) -> Result<Value, (String, String)>;

/// Per-type checks, indexed by `ColumnType::index`.
static FIELD_CHECKS: [FieldCheck; ColumnType::COUNT] = [
    check_text,
    check_number,
    check_date,
    check_select,
    check_checkbox,
    check_relation,
];

fn field_check(column_type: ColumnType) -> FieldCheck {
    FIELD_CHECKS[column_type.index()]
}

/// Validates candidate row data against a table's columns.
///
/// The validator holds no table state; it is a pure function of
/// `(columns, data)` plus the unknown-field policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowValidator {
    policy: UnknownFieldPolicy,
}

impl RowValidator {
    pub fn new(policy: UnknownFieldPolicy) -> Self {
        Self { policy }
    }

    /// Validates `data` and returns the normalized row data.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if:
    /// - data is not an object (TABULA_MALFORMED_ROW)
    /// - a key names no column and the policy is reject (TABULA_UNKNOWN_FIELD)
    /// - a value is null or fails its type check (TABULA_TYPE_MISMATCH)
    /// - a required column is absent (TABULA_MISSING_FIELD)
    pub fn validate(&self, columns: &[Column], data: &Value) -> SchemaResult<RowData> {
        let obj = data
            .as_object()
            .ok_or_else(|| SchemaError::malformed_row(json_type_name(data)))?;

        let mut normalized = RowData::new();

        for (key, value) in obj {
            let Some(column) = columns.iter().find(|c| &c.name == key) else {
                match self.policy {
                    UnknownFieldPolicy::Reject => return Err(SchemaError::unknown_field(key)),
                    UnknownFieldPolicy::Drop => continue,
                }
            };

            if value.is_null() {
                return Err(SchemaError::type_mismatch(ValidationDetails::null_value(key)));
            }

            let value = field_check(column.column_type)(column, value).map_err(
                |(expected, actual)| {
                    SchemaError::type_mismatch(ValidationDetails::new(key, expected, actual))
                },
            )?;
            normalized.insert(key.clone(), value);
        }

        for column in columns.iter().filter(|c| c.required) {
            if !normalized.contains_key(&column.name) {
                return Err(SchemaError::missing_field(&column.name));
            }
        }

        Ok(normalized)
    }
}

/// Validates with the default (reject) unknown-field policy.
pub fn validate(columns: &[Column], data: &Value) -> SchemaResult<RowData> {
    RowValidator::default().validate(columns, data)
}

fn check_text(_column: &Column, value: &Value) -> Result<Value, (String, String)> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
        other => Err(mismatch("scalar", other)),
    }
}

fn check_number(_column: &Column, value: &Value) -> Result<Value, (String, String)> {
    if value.is_number() {
        Ok(value.clone())
    } else {
        Err(mismatch("number", value))
    }
}

fn check_date(_column: &Column, value: &Value) -> Result<Value, (String, String)> {
    let parsed = match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    match parsed {
        Some(dt) => Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))),
        None => Err(("date".into(), describe(value))),
    }
}

fn check_select(column: &Column, value: &Value) -> Result<Value, (String, String)> {
    let allowed = || format!("one of [{}]", column.options.join(", "));
    match value.as_str() {
        Some(s) if column.options.iter().any(|o| o == s) => Ok(value.clone()),
        Some(_) => Err((allowed(), describe(value))),
        None => Err((allowed(), json_type_name(value).into())),
    }
}

fn check_checkbox(_column: &Column, value: &Value) -> Result<Value, (String, String)> {
    if value.is_boolean() {
        Ok(value.clone())
    } else {
        Err(mismatch("boolean", value))
    }
}

fn check_relation(_column: &Column, value: &Value) -> Result<Value, (String, String)> {
    let id = value.as_str().and_then(normalize_identifier);
    match id {
        Some(id) => Ok(Value::String(id)),
        None => Err(("identifier".into(), describe(value))),
    }
}

/// Accepts RFC 3339, naive date-times and plain dates (taken as UTC).
fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A UUID (normalized to lowercase hyphenated form) or a 24 hex digit
/// object id (lowercased).
fn normalize_identifier(s: &str) -> Option<String> {
    if s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Some(s.to_ascii_lowercase());
    }
    Uuid::try_parse(s).ok().map(|id| id.hyphenated().to_string())
}

fn mismatch(expected: &str, actual: &Value) -> (String, String) {
    (expected.into(), json_type_name(actual).into())
}

/// Type name plus the offending value, for scalar values.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string '{}'", s),
        Value::Number(n) => format!("number {}", n),
        other => json_type_name(other).into(),
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
