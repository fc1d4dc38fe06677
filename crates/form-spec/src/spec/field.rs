use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::autofill::AutoFillSpec;
use crate::condition::Condition;
use crate::spec::validation::ValidationRules;

/// Ordered mapping from a field key to its definition.
pub type FieldMap = IndexMap<String, FieldSpec>;

/// Every input type a schema may declare.
///
/// `group` is the only variant carrying children; all other variants hold a
/// leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Tel,
    Url,
    Search,
    Date,
    DatetimeLocal,
    Time,
    Month,
    Week,
    Color,
    Range,
    File,
    Hidden,
    Textarea,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    Switch,
    Rating,
    Slider,
    Autocomplete,
    Tags,
    RichText,
    Code,
    Json,
    Group {
        #[serde(default)]
        fields: FieldMap,
    },
}

impl FieldKind {
    /// Wire names accepted for the `type` property.
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "text",
        "email",
        "password",
        "number",
        "tel",
        "url",
        "search",
        "date",
        "datetime-local",
        "time",
        "month",
        "week",
        "color",
        "range",
        "file",
        "hidden",
        "textarea",
        "select",
        "multiselect",
        "radio",
        "checkbox",
        "switch",
        "rating",
        "slider",
        "autocomplete",
        "tags",
        "rich-text",
        "code",
        "json",
        "group",
    ];

    /// Wire name of this kind, as written in the `type` property.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Tel => "tel",
            FieldKind::Url => "url",
            FieldKind::Search => "search",
            FieldKind::Date => "date",
            FieldKind::DatetimeLocal => "datetime-local",
            FieldKind::Time => "time",
            FieldKind::Month => "month",
            FieldKind::Week => "week",
            FieldKind::Color => "color",
            FieldKind::Range => "range",
            FieldKind::File => "file",
            FieldKind::Hidden => "hidden",
            FieldKind::Textarea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Multiselect => "multiselect",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Switch => "switch",
            FieldKind::Rating => "rating",
            FieldKind::Slider => "slider",
            FieldKind::Autocomplete => "autocomplete",
            FieldKind::Tags => "tags",
            FieldKind::RichText => "rich-text",
            FieldKind::Code => "code",
            FieldKind::Json => "json",
            FieldKind::Group { .. } => "group",
        }
    }
}

/// A selectable option, either a bare literal or a labeled entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldOption {
    Labeled {
        label: String,
        value: Value,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        disabled: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Literal(Value),
}

impl FieldOption {
    pub fn value(&self) -> &Value {
        match self {
            FieldOption::Labeled { value, .. } => value,
            FieldOption::Literal(value) => value,
        }
    }
}

/// Definition of a single input, or of a group of inputs, inside a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_fill: Option<AutoFillSpec>,
}

impl FieldSpec {
    /// Creates a leaf or group field with no label, rules or conditions.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            kind,
            label: None,
            description: None,
            required: false,
            validation: None,
            options: None,
            visibility_condition: None,
            auto_fill: None,
        }
    }

    /// Child fields when this is a group.
    pub fn children(&self) -> Option<&FieldMap> {
        match &self.kind {
            FieldKind::Group { fields } => Some(fields),
            _ => None,
        }
    }

    /// Name used in generated messages: the label when present, else the name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// A checkbox with options collects several values rather than a single flag.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self.kind, FieldKind::Checkbox) && self.options.is_some()
    }
}
