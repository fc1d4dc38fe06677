use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::path::get_path;

/// Comparison applied between a snapshot value and a rule literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    In,
    NotIn,
    Exists,
    NotExists,
}

impl Operator {
    pub const NAMES: &'static [&'static str] = &[
        "equals",
        "not_equals",
        "contains",
        "not_contains",
        "in",
        "not_in",
        "exists",
        "not_exists",
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "equals" => Some(Operator::Equals),
            "not_equals" => Some(Operator::NotEquals),
            "contains" => Some(Operator::Contains),
            "not_contains" => Some(Operator::NotContains),
            "in" => Some(Operator::In),
            "not_in" => Some(Operator::NotIn),
            "exists" => Some(Operator::Exists),
            "not_exists" => Some(Operator::NotExists),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
        }
    }
}

/// How the rules of a compound condition are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "and",
            Logic::Or => "or",
        }
    }
}

/// A single `field operator value` test.
///
/// `operator` is `None` when the document omitted it or named an operator this
/// engine does not know; such a rule never hides or invalidates anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionRule {
    pub field: String,
    pub operator: Option<Operator>,
    pub value: Option<Value>,
}

/// Predicate over the current value snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Rule(ConditionRule),
    Compound {
        logic: Logic,
        conditions: Vec<ConditionRule>,
    },
    /// Any other shape, kept verbatim. Always holds.
    Malformed(Value),
}

/// Evaluates an optional condition; an absent condition always holds.
pub fn evaluate(condition: Option<&Condition>, snapshot: &Value) -> bool {
    condition.is_none_or(|condition| condition.evaluate(snapshot))
}

impl ConditionRule {
    pub fn new(field: impl Into<String>, operator: Operator, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            operator: Some(operator),
            value,
        }
    }

    fn from_value(raw: &Value) -> Self {
        let field = raw
            .get("field")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let operator = raw
            .get("operator")
            .and_then(Value::as_str)
            .and_then(Operator::parse);
        Self {
            field,
            operator,
            value: raw.get("value").cloned(),
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("field".into(), Value::String(self.field.clone()));
        if let Some(operator) = self.operator {
            map.insert("operator".into(), Value::String(operator.as_str().into()));
        }
        if let Some(value) = &self.value {
            map.insert("value".into(), value.clone());
        }
        Value::Object(map)
    }

    pub fn evaluate(&self, snapshot: &Value) -> bool {
        let Some(operator) = self.operator else {
            return true;
        };
        if self.field.is_empty() {
            return true;
        }
        let actual = get_path(snapshot, &self.field);
        let literal = self.value.as_ref();

        match operator {
            Operator::Equals => strict_equals(actual, literal),
            Operator::NotEquals => !strict_equals(actual, literal),
            Operator::Contains => contains(actual, literal),
            Operator::NotContains => !contains(actual, literal),
            Operator::In => member_of(actual, literal),
            Operator::NotIn => !member_of(actual, literal),
            Operator::Exists => exists(actual),
            Operator::NotExists => !exists(actual),
        }
    }
}

impl Condition {
    /// Single-rule condition.
    pub fn rule(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Condition::Rule(ConditionRule::new(field, operator, Some(value)))
    }

    /// Reads any JSON value as a condition without ever failing.
    pub fn from_value(raw: &Value) -> Self {
        let Some(object) = raw.as_object() else {
            tracing::warn!(condition = %raw, "condition is not an object; treating it as always true");
            return Condition::Malformed(raw.clone());
        };

        let has_field = object
            .get("field")
            .and_then(Value::as_str)
            .is_some_and(|field| !field.is_empty());
        let operator = object.get("operator").filter(|value| is_truthy(value));

        if has_field && let Some(operator) = operator {
            if operator.as_str().and_then(Operator::parse).is_none() {
                tracing::warn!(%operator, "unrecognized condition operator; treating it as always true");
                return Condition::Malformed(raw.clone());
            }
            return Condition::Rule(ConditionRule::from_value(raw));
        }

        if let Some(entries) = object.get("conditions").and_then(Value::as_array)
            && !entries.is_empty()
        {
            let logic = match object.get("logic").and_then(Value::as_str) {
                Some("or") => Logic::Or,
                _ => Logic::And,
            };
            return Condition::Compound {
                logic,
                conditions: entries.iter().map(ConditionRule::from_value).collect(),
            };
        }

        Condition::Malformed(raw.clone())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Condition::Rule(rule) => rule.to_value(),
            Condition::Compound { logic, conditions } => {
                let mut map = Map::new();
                map.insert("logic".into(), Value::String(logic.as_str().into()));
                map.insert(
                    "conditions".into(),
                    Value::Array(conditions.iter().map(ConditionRule::to_value).collect()),
                );
                Value::Object(map)
            }
            Condition::Malformed(raw) => raw.clone(),
        }
    }

    pub fn evaluate(&self, snapshot: &Value) -> bool {
        match self {
            Condition::Rule(rule) => rule.evaluate(snapshot),
            Condition::Compound {
                logic: Logic::And,
                conditions,
            } => conditions.iter().all(|rule| rule.evaluate(snapshot)),
            Condition::Compound {
                logic: Logic::Or,
                conditions,
            } => conditions.iter().any(|rule| rule.evaluate(snapshot)),
            Condition::Malformed(_) => true,
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Equality between two JSON values where integers and floats of the same
/// magnitude compare equal.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn strict_equals(actual: Option<&Value>, literal: Option<&Value>) -> bool {
    match (actual, literal) {
        (None, None) => true,
        (Some(actual), Some(literal)) => values_equal(actual, literal),
        _ => false,
    }
}

fn contains(actual: Option<&Value>, literal: Option<&Value>) -> bool {
    match (actual, literal) {
        (Some(Value::String(text)), Some(Value::String(needle))) => text.contains(needle.as_str()),
        (Some(Value::Array(items)), Some(literal)) => {
            items.iter().any(|item| values_equal(item, literal))
        }
        _ => false,
    }
}

fn member_of(actual: Option<&Value>, literal: Option<&Value>) -> bool {
    match (actual, literal) {
        (Some(actual), Some(Value::Array(members))) => {
            members.iter().any(|member| values_equal(member, actual))
        }
        _ => false,
    }
}

fn exists(actual: Option<&Value>) -> bool {
    match actual {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Condition::from_value(&raw))
    }
}

impl JsonSchema for Condition {
    fn schema_name() -> Cow<'static, str> {
        "Condition".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "description": "Single rule (`field`, `operator`, `value`) or compound rule list (`logic`, `conditions`).",
            "type": "object",
            "properties": {
                "field": { "type": "string" },
                "operator": { "type": "string", "enum": Operator::NAMES },
                "value": {},
                "logic": { "type": "string", "enum": ["and", "or"] },
                "conditions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": { "type": "string" },
                            "operator": { "type": "string", "enum": Operator::NAMES },
                            "value": {}
                        },
                        "required": ["field", "operator"]
                    }
                }
            }
        })
    }
}
