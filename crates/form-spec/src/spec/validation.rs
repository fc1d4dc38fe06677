use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Built-in string formats checked by the validation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationFormat {
    Email,
    Url,
    Phone,
    Date,
    Time,
    Datetime,
    PostalCode,
    CreditCard,
}

impl ValidationFormat {
    pub const NAMES: &'static [&'static str] = &[
        "email",
        "url",
        "date",
        "time",
        "datetime",
        "phone",
        "postal-code",
        "credit-card",
    ];
}

/// Rule kinds that accept a message override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    Required,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    Format,
    Custom,
}

/// Per-rule message overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl ValidationMessages {
    pub const KEYS: &'static [&'static str] = &[
        "required",
        "min",
        "max",
        "minLength",
        "maxLength",
        "pattern",
        "format",
        "custom",
    ];

    pub fn get(&self, key: MessageKey) -> Option<&str> {
        let slot = match key {
            MessageKey::Required => &self.required,
            MessageKey::Min => &self.min,
            MessageKey::Max => &self.max,
            MessageKey::MinLength => &self.min_length,
            MessageKey::MaxLength => &self.max_length,
            MessageKey::Pattern => &self.pattern,
            MessageKey::Format => &self.format,
            MessageKey::Custom => &self.custom,
        };
        slot.as_deref()
    }

    /// Overlays every message set in `other`, keeping the ones it leaves unset.
    pub fn merge_from(&mut self, other: &ValidationMessages) {
        overlay(&mut self.required, &other.required);
        overlay(&mut self.min, &other.min);
        overlay(&mut self.max, &other.max);
        overlay(&mut self.min_length, &other.min_length);
        overlay(&mut self.max_length, &other.max_length);
        overlay(&mut self.pattern, &other.pattern);
        overlay(&mut self.format, &other.format);
        overlay(&mut self.custom, &other.custom);
    }
}

/// A guarded overlay of validation properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionalRule {
    pub condition: Condition,
    pub validation: ValidationRules,
}

/// Validation constraints attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ValidationFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<ValidationMessages>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_rules: Vec<ConditionalRule>,
}

impl ValidationRules {
    /// Property names accepted inside a `validation` object.
    pub const KEYS: &'static [&'static str] = &[
        "min",
        "max",
        "minLength",
        "maxLength",
        "pattern",
        "format",
        "custom",
        "required",
        "messages",
        "conditionalRules",
    ];

    /// Shallow-merges the properties set in `overlay`; messages merge key by key.
    ///
    /// Nested `conditionalRules` of the overlay are not carried over.
    pub fn apply_overlay(&mut self, overlay_rules: &ValidationRules) {
        overlay(&mut self.min, &overlay_rules.min);
        overlay(&mut self.max, &overlay_rules.max);
        overlay(&mut self.min_length, &overlay_rules.min_length);
        overlay(&mut self.max_length, &overlay_rules.max_length);
        overlay(&mut self.pattern, &overlay_rules.pattern);
        overlay(&mut self.format, &overlay_rules.format);
        overlay(&mut self.custom, &overlay_rules.custom);
        overlay(&mut self.required, &overlay_rules.required);
        if let Some(messages) = &overlay_rules.messages {
            self.messages
                .get_or_insert_with(ValidationMessages::default)
                .merge_from(messages);
        }
    }

    /// Override message for a rule kind, if one is configured.
    pub fn message(&self, key: MessageKey) -> Option<&str> {
        self.messages.as_ref().and_then(|messages| messages.get(key))
    }
}

fn overlay<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}
