use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SpecError;
use crate::report::{RequiredCheck, ValidationReport};
use crate::schema_check::{check_schema, parse_json};
use crate::spec::field::{FieldMap, FieldSpec};
use crate::structure::{Submission, check_required, find_missing_required, structure};
use crate::validate::validate_all;
use crate::visibility::{VisibilityMap, filter_visible, resolve_visibility};

/// Top-level form schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: FieldMap,
}

impl FormSchema {
    /// Accepts a schema document after it passes [`check_schema`].
    ///
    /// Warnings are logged and do not block the schema.
    pub fn from_value(document: Value) -> Result<Self, SpecError> {
        let check = check_schema(&document);
        for warning in &check.warnings {
            tracing::warn!(%warning, "schema accepted with warning");
        }
        if !check.valid {
            return Err(SpecError::InvalidSchema(check.errors));
        }
        serde_json::from_value(document).map_err(SpecError::Model)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SpecError> {
        Self::from_value(parse_json(text)?)
    }

    /// Looks up a field by dotted path through nested groups.
    pub fn find_field(&self, path: &str) -> Option<&FieldSpec> {
        let mut segments = path.split('.');
        let mut field = self.fields.get(segments.next()?)?;
        for segment in segments {
            field = field.children()?.get(segment)?;
        }
        Some(field)
    }

    pub fn visible_fields(&self, snapshot: &Value) -> FieldMap {
        filter_visible(&self.fields, snapshot)
    }

    pub fn visibility(&self, snapshot: &Value) -> VisibilityMap {
        resolve_visibility(&self.fields, snapshot)
    }

    pub fn validate(&self, snapshot: &Value) -> ValidationReport {
        validate_all(&self.fields, snapshot)
    }

    pub fn structure(&self, snapshot: &Value) -> Value {
        structure(&self.fields, snapshot)
    }

    /// Structures `snapshot` and stamps it with the current time.
    pub fn submission(&self, snapshot: &Value) -> Submission {
        Submission::now(self.structure(snapshot))
    }

    pub fn missing_required(&self, snapshot: &Value) -> Vec<String> {
        find_missing_required(&self.fields, snapshot)
    }

    pub fn check_required(&self, snapshot: &Value) -> RequiredCheck {
        check_required(&self.fields, snapshot)
    }
}
