use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SpecError;
use crate::path::join_path;
use crate::spec::field::FieldKind;
use crate::spec::form::FormSchema;
use crate::spec::validation::{ValidationFormat, ValidationMessages, ValidationRules};

/// Outcome of the static shape check of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaCheck {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl SchemaCheck {
    fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }
}

/// Parses schema text, reporting the parser message on syntax errors.
pub fn parse_json(text: &str) -> Result<Value, SpecError> {
    serde_json::from_str(text).map_err(SpecError::Json)
}

/// Checks that `document` has the shape of a form schema.
///
/// This looks at the document only; conditions are not evaluated.
pub fn check_schema(document: &Value) -> SchemaCheck {
    let Some(root) = document.as_object() else {
        return SchemaCheck::rejected("Schema must be an object");
    };
    let Some(fields) = root.get("fields").and_then(Value::as_object) else {
        return SchemaCheck::rejected(
            "Schema must have a \"fields\" object containing field definitions",
        );
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    if fields.is_empty() {
        warnings.push("Schema has no fields defined".to_string());
    }
    for prop in ["title", "description"] {
        if root.get(prop).is_some_and(|value| !value.is_string() && !value.is_null()) {
            errors.push(format!("Schema {prop} must be a string"));
        }
    }
    check_fields(fields, "", &mut errors);

    // Anything the targeted checks miss must still load as a `FormSchema`.
    if errors.is_empty()
        && let Err(err) = serde_json::from_value::<FormSchema>(document.clone())
    {
        errors.push(format!("Schema does not match the field model: {err}"));
    }

    SchemaCheck {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_fields(fields: &Map<String, Value>, prefix: &str, errors: &mut Vec<String>) {
    for (key, field) in fields {
        let name = join_path(prefix, key);
        match field.as_object() {
            Some(field) => check_field(field, &name, errors),
            None => errors.push(format!("Field \"{name}\" must be an object")),
        }
    }
}

fn check_field(field: &Map<String, Value>, name: &str, errors: &mut Vec<String>) {
    for prop in ["id", "name", "type"] {
        if !field.contains_key(prop) {
            errors.push(format!(
                "Field \"{name}\" is missing required property: {prop}"
            ));
        }
    }

    for prop in ["id", "name", "label", "description"] {
        let optional = matches!(prop, "label" | "description");
        if field
            .get(prop)
            .is_some_and(|value| !value.is_string() && !(optional && value.is_null()))
        {
            errors.push(format!("Field \"{name}\" {prop} property must be a string"));
        }
    }

    if let Some(kind) = field.get("type") {
        let known = kind
            .as_str()
            .is_some_and(|kind| FieldKind::TYPE_NAMES.contains(&kind));
        if !known {
            errors.push(format!(
                "Field \"{name}\" has invalid type: {}. Valid types: {}",
                display(kind),
                FieldKind::TYPE_NAMES.join(", ")
            ));
        }
    }

    if let Some(validation) = field.get("validation") {
        match validation.as_object() {
            Some(validation) => check_validation(validation, name, "validation", errors),
            None => errors.push(format!(
                "Field \"{name}\" validation property must be an object"
            )),
        }
    }

    for flag in ["required", "disabled"] {
        if field.get(flag).is_some_and(|value| !value.is_boolean()) {
            errors.push(format!(
                "Field \"{name}\" {flag} property must be a boolean"
            ));
        }
    }

    if field.get("options").is_some_and(|options| !options.is_array()) {
        errors.push(format!("Field \"{name}\" options property must be an array"));
    }

    if field.get("type").and_then(Value::as_str) == Some("group")
        && let Some(children) = field.get("fields")
    {
        match children.as_object() {
            Some(children) => check_fields(children, name, errors),
            None => errors.push(format!(
                "Field \"{name}\" fields property must be an object"
            )),
        }
    }
}

fn check_validation(
    validation: &Map<String, Value>,
    name: &str,
    scope: &str,
    errors: &mut Vec<String>,
) {
    for (key, value) in validation {
        if !ValidationRules::KEYS.contains(&key.as_str()) {
            errors.push(format!(
                "Field \"{name}\" has invalid {scope} property: {key}"
            ));
            continue;
        }

        match key.as_str() {
            "min" | "max" | "minLength" | "maxLength" if !value.is_number() => {
                errors.push(format!("Field \"{name}\" {scope}.{key} must be a number"));
            }
            "minLength" | "maxLength" if !value.is_u64() => {
                errors.push(format!(
                    "Field \"{name}\" {scope}.{key} must be a non-negative integer"
                ));
            }
            "pattern" | "custom" if !value.is_string() => {
                errors.push(format!("Field \"{name}\" {scope}.{key} must be a string"));
            }
            "required" if !value.is_boolean() => {
                errors.push(format!("Field \"{name}\" {scope}.{key} must be a boolean"));
            }
            "format" => {
                let known = value
                    .as_str()
                    .is_some_and(|format| ValidationFormat::NAMES.contains(&format));
                if !known {
                    errors.push(format!(
                        "Field \"{name}\" {scope}.format has invalid value: {}. Valid formats: {}",
                        display(value),
                        ValidationFormat::NAMES.join(", ")
                    ));
                }
            }
            "messages" => check_messages(value, name, scope, errors),
            "conditionalRules" => check_conditional_rules(value, name, scope, errors),
            _ => {}
        }
    }
}

fn check_messages(value: &Value, name: &str, scope: &str, errors: &mut Vec<String>) {
    let Some(messages) = value.as_object() else {
        errors.push(format!(
            "Field \"{name}\" {scope}.messages must be an object"
        ));
        return;
    };
    for (key, message) in messages {
        if !ValidationMessages::KEYS.contains(&key.as_str()) {
            errors.push(format!(
                "Field \"{name}\" {scope}.messages has invalid property: {key}"
            ));
        } else if !message.is_string() {
            errors.push(format!(
                "Field \"{name}\" {scope}.messages.{key} must be a string"
            ));
        }
    }
}

fn check_conditional_rules(value: &Value, name: &str, scope: &str, errors: &mut Vec<String>) {
    let Some(rules) = value.as_array() else {
        errors.push(format!(
            "Field \"{name}\" {scope}.conditionalRules must be an array"
        ));
        return;
    };
    for (index, rule) in rules.iter().enumerate() {
        let rule_scope = format!("{scope}.conditionalRules[{index}]");
        let Some(rule) = rule.as_object() else {
            errors.push(format!("Field \"{name}\" {rule_scope} must be an object"));
            continue;
        };
        if !rule.contains_key("condition") {
            errors.push(format!(
                "Field \"{name}\" {rule_scope} is missing required property: condition"
            ));
        }
        match rule.get("validation").and_then(Value::as_object) {
            Some(overlay) => {
                check_validation(overlay, name, &format!("{rule_scope}.validation"), errors)
            }
            None => errors.push(format!(
                "Field \"{name}\" {rule_scope}.validation must be an object"
            )),
        }
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
