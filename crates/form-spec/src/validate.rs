use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::formats::check_format;
use crate::path::{get_path, join_path};
use crate::report::{ErrorKind, FieldError, ValidationReport};
use crate::spec::field::{FieldMap, FieldSpec};
use crate::spec::validation::{MessageKey, ValidationRules};
use crate::visibility::filter_visible;

/// Base rules with every currently matching conditional rule merged in, in order.
pub fn merge_conditional(base: Option<&ValidationRules>, snapshot: &Value) -> ValidationRules {
    let Some(base) = base else {
        return ValidationRules::default();
    };
    let mut effective = base.clone();
    for (index, rule) in base.conditional_rules.iter().enumerate() {
        if rule.condition.evaluate(snapshot) {
            tracing::debug!(rule = index, "conditional validation rule applies");
            effective.apply_overlay(&rule.validation);
        }
    }
    effective
}

pub fn effective_validation(field: &FieldSpec, snapshot: &Value) -> ValidationRules {
    merge_conditional(field.validation.as_ref(), snapshot)
}

pub fn has_conditional_rules(validation: Option<&ValidationRules>) -> bool {
    validation.is_some_and(|rules| !rules.conditional_rules.is_empty())
}

/// Field-level `required`, or `required: true` from the base rules or any matching conditional rule.
pub fn is_effectively_required(field: &FieldSpec, snapshot: &Value) -> bool {
    if field.required {
        return true;
    }
    let Some(rules) = &field.validation else {
        return false;
    };
    rules.required == Some(true)
        || rules.conditional_rules.iter().any(|rule| {
            rule.validation.required == Some(true) && rule.condition.evaluate(snapshot)
        })
}

/// `None`, null, empty string and empty array count as "no value".
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Validates one candidate value; the first failing check wins.
pub fn validate_field(
    value: Option<&Value>,
    field: &FieldSpec,
    snapshot: &Value,
) -> Option<FieldError> {
    let rules = effective_validation(field, snapshot);

    let value = match value {
        Some(value) if !is_empty_value(Some(value)) => value,
        _ => {
            if !is_effectively_required(field, snapshot) {
                return None;
            }
            let message = rules
                .message(MessageKey::Required)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} is required", field.display_name()));
            return Some(FieldError::new(ErrorKind::Required, message));
        }
    };

    if let Some(text) = value.as_str()
        && let Some(error) = check_length(text, &rules)
    {
        return Some(error);
    }

    if let Some(number) = numeric_value(value)
        && let Some(error) = check_range(number, &rules)
    {
        return Some(error);
    }

    if let Some(pattern) = &rules.pattern
        && let Some(text) = value.as_str()
    {
        match Regex::new(pattern) {
            Ok(regex) if !regex.is_match(text) => {
                let message = rules.message(MessageKey::Pattern).unwrap_or("Invalid format");
                return Some(FieldError::new(ErrorKind::Pattern, message));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(field = %field.name, %pattern, error = %err, "skipping invalid validation pattern");
            }
        }
    }

    if let Some(format) = rules.format
        && let Some(text) = value.as_str()
        && let Err(default_message) = check_format(text, format)
    {
        let message = rules.message(MessageKey::Format).unwrap_or(default_message);
        return Some(FieldError::new(ErrorKind::Format, message));
    }

    if let Some(custom) = &rules.custom {
        tracing::debug!(field = %field.name, %custom, "custom validation is not evaluated");
    }

    None
}

fn check_length(text: &str, rules: &ValidationRules) -> Option<FieldError> {
    let length = text.chars().count();
    if let Some(min_length) = rules.min_length
        && length < min_length
    {
        let message = rules
            .message(MessageKey::MinLength)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Must be at least {min_length} characters"));
        return Some(FieldError::new(ErrorKind::Length, message));
    }
    if let Some(max_length) = rules.max_length
        && length > max_length
    {
        let message = rules
            .message(MessageKey::MaxLength)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Cannot exceed {max_length} characters"));
        return Some(FieldError::new(ErrorKind::Length, message));
    }
    None
}

fn check_range(number: f64, rules: &ValidationRules) -> Option<FieldError> {
    if let Some(min) = rules.min
        && number < min
    {
        let message = rules
            .message(MessageKey::Min)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Must be at least {}", format_limit(min)));
        return Some(FieldError::new(ErrorKind::Range, message));
    }
    if let Some(max) = rules.max
        && number > max
    {
        let message = rules
            .message(MessageKey::Max)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Cannot exceed {}", format_limit(max)));
        return Some(FieldError::new(ErrorKind::Range, message));
    }
    None
}

/// Numbers, and strings that parse as finite numbers.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
        }
        _ => None,
    }
}

fn format_limit(limit: f64) -> String {
    if limit.fract() == 0.0 && limit.abs() < 1e15 {
        format!("{}", limit as i64)
    } else {
        limit.to_string()
    }
}

/// Validates every visible leaf field; hidden fields are never checked.
pub fn validate_all(fields: &FieldMap, snapshot: &Value) -> ValidationReport {
    let visible = filter_visible(fields, snapshot);
    let mut errors = IndexMap::new();
    collect_errors(&visible, snapshot, "", &mut errors);
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn collect_errors(
    fields: &FieldMap,
    snapshot: &Value,
    prefix: &str,
    errors: &mut IndexMap<String, FieldError>,
) {
    for (key, field) in fields {
        let path = join_path(prefix, key);
        match field.children() {
            Some(children) => collect_errors(children, snapshot, &path, errors),
            None => {
                if let Some(error) = validate_field(get_path(snapshot, &path), field, snapshot) {
                    errors.insert(path, error);
                }
            }
        }
    }
}
