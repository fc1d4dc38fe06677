use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::condition::is_truthy;
use crate::path::{get_path, join_path};
use crate::report::RequiredCheck;
use crate::spec::field::{FieldKind, FieldMap, FieldSpec};
use crate::validate::{is_effectively_required, is_empty_value};
use crate::visibility::filter_visible;

/// Rebuilds the visible part of `snapshot` in the shape of the schema.
///
/// Hidden fields are omitted entirely; group values are always objects.
pub fn structure(fields: &FieldMap, snapshot: &Value) -> Value {
    let visible = filter_visible(fields, snapshot);
    Value::Object(build_object(&visible, snapshot))
}

fn build_object(fields: &FieldMap, values: &Value) -> Map<String, Value> {
    let mut output = Map::new();
    for (key, field) in fields {
        let raw = values.as_object().and_then(|values| values.get(key));
        let value = match field.children() {
            Some(children) => {
                let nested = raw
                    .filter(|value| value.is_object())
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                Value::Object(build_object(children, &nested))
            }
            None => coerce(raw, field),
        };
        output.insert(key.clone(), value);
    }
    output
}

/// Structured payload stamped with the time it was submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub data: Value,
    pub submitted_at: DateTime<Utc>,
    /// `submitted_at` in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Submission {
    pub fn new(data: Value, submitted_at: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: submitted_at.timestamp_millis(),
            submitted_at,
        }
    }

    pub fn now(data: Value) -> Self {
        Self::new(data, Utc::now())
    }
}

/// Converts a raw snapshot value into its submission form for the field's type.
///
/// Only `number` and `checkbox` values are converted; every other type passes
/// through, with an absent value becoming `null`.
pub fn coerce(value: Option<&Value>, field: &FieldSpec) -> Value {
    match field.kind {
        FieldKind::Number => match value {
            None | Some(Value::Null) => Value::Null,
            Some(Value::Number(number)) => Value::Number(number.clone()),
            Some(Value::String(text)) => parse_number(text).unwrap_or(Value::Null),
            Some(_) => Value::Null,
        },
        FieldKind::Checkbox if field.is_multi_valued() => match value {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            _ => Value::Array(Vec::new()),
        },
        FieldKind::Checkbox => Value::Bool(value.is_some_and(is_truthy)),
        _ => value.cloned().unwrap_or(Value::Null),
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Value::Number(Number::from(integer)));
    }
    if let Ok(integer) = trimmed.parse::<u64>() {
        return Some(Value::Number(Number::from(integer)));
    }
    let number = trimmed.parse::<f64>().ok().filter(|number| number.is_finite())?;
    if number.fract() == 0.0 && number.abs() < 9.0e15 {
        Some(Value::Number(Number::from(number as i64)))
    } else {
        Number::from_f64(number).map(Value::Number)
    }
}

/// Dotted paths of visible fields that are effectively required but empty.
pub fn find_missing_required(fields: &FieldMap, snapshot: &Value) -> Vec<String> {
    let visible = filter_visible(fields, snapshot);
    let mut missing = Vec::new();
    collect_missing(&visible, snapshot, "", &mut missing);
    missing
}

fn collect_missing(fields: &FieldMap, snapshot: &Value, prefix: &str, missing: &mut Vec<String>) {
    for (key, field) in fields {
        let path = join_path(prefix, key);
        match field.children() {
            Some(children) => collect_missing(children, snapshot, &path, missing),
            None => {
                if is_effectively_required(field, snapshot)
                    && is_empty_value(get_path(snapshot, &path))
                {
                    missing.push(path);
                }
            }
        }
    }
}

pub fn check_required(fields: &FieldMap, snapshot: &Value) -> RequiredCheck {
    let missing_fields = find_missing_required(fields, snapshot);
    RequiredCheck {
        valid: missing_fields.is_empty(),
        missing_fields,
    }
}
