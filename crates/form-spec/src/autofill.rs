use std::collections::HashMap;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::{get_path, set_path};

/// Event that starts an auto-fill lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum AutoFillTrigger {
    #[default]
    OnBlur,
    OnChange,
}

fn default_debounce_ms() -> u64 {
    500
}

/// Lookup attached to a field whose response fills other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutoFillSpec {
    /// Name of the lookup the host application resolves.
    pub api_function: String,
    /// Dotted field path to the response key that fills it.
    pub target_fields: IndexMap<String, String>,
    #[serde(default)]
    pub trigger: AutoFillTrigger,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Handle for one lookup started for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoFillTicket {
    path: String,
    trigger_value: String,
    generation: u64,
}

impl AutoFillTicket {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn trigger_value(&self) -> &str {
        &self.trigger_value
    }
}

/// What happened to a lookup response.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoFillOutcome {
    /// The response was merged; `updated` lists the paths written.
    Applied { snapshot: Value, updated: Vec<String> },
    /// A newer lookup for the same field was started, or it was cancelled.
    Superseded,
    /// The field no longer holds the value that started the lookup.
    Stale,
    /// The response carried none of the mapped keys.
    Empty,
}

#[derive(Debug, Clone)]
struct PathState {
    generation: u64,
    last_value: String,
    in_flight: bool,
}

/// Tracks the latest lookup per field so late responses cannot overwrite newer input.
#[derive(Debug, Default)]
pub struct AutoFillTracker {
    next_generation: u64,
    paths: HashMap<String, PathState>,
}

impl AutoFillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a lookup for `path`, superseding any earlier one.
    ///
    /// Returns `None` for blank values and for a repeat of the last looked-up value.
    pub fn begin(&mut self, path: &str, value: &str) -> Option<AutoFillTicket> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.cancel(path);
            return None;
        }
        if self
            .paths
            .get(path)
            .is_some_and(|state| state.last_value == trimmed)
        {
            return None;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.paths.insert(
            path.to_string(),
            PathState {
                generation,
                last_value: trimmed.to_string(),
                in_flight: true,
            },
        );
        tracing::debug!(%path, generation, "auto-fill lookup started");
        Some(AutoFillTicket {
            path: path.to_string(),
            trigger_value: trimmed.to_string(),
            generation,
        })
    }

    /// Drops any pending lookup for `path`; returns whether one was pending.
    pub fn cancel(&mut self, path: &str) -> bool {
        self.paths
            .remove(path)
            .is_some_and(|state| state.in_flight)
    }

    pub fn is_current(&self, ticket: &AutoFillTicket) -> bool {
        self.paths
            .get(&ticket.path)
            .is_some_and(|state| state.in_flight && state.generation == ticket.generation)
    }

    /// Merges `response` into `snapshot` through the lookup's `target_fields` mapping.
    pub fn apply(
        &mut self,
        ticket: &AutoFillTicket,
        spec: &AutoFillSpec,
        snapshot: &Value,
        response: &Value,
    ) -> AutoFillOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(path = %ticket.path, "discarding superseded auto-fill response");
            return AutoFillOutcome::Superseded;
        }
        if let Some(state) = self.paths.get_mut(&ticket.path) {
            state.in_flight = false;
        }

        let current = get_path(snapshot, &ticket.path)
            .and_then(Value::as_str)
            .map(str::trim);
        if current != Some(ticket.trigger_value.as_str()) {
            tracing::debug!(path = %ticket.path, "discarding stale auto-fill response");
            return AutoFillOutcome::Stale;
        }

        let mut next = snapshot.clone();
        let mut updated = Vec::new();
        for (target, response_key) in &spec.target_fields {
            if let Some(value) = get_path(response, response_key) {
                next = set_path(&next, target, value.clone());
                updated.push(target.clone());
            }
        }

        if updated.is_empty() {
            AutoFillOutcome::Empty
        } else {
            AutoFillOutcome::Applied {
                snapshot: next,
                updated,
            }
        }
    }
}
