use serde_json::{Map, Value};

/// Reads the value at a dot-delimited path.
///
/// Returns `None` as soon as a segment is missing or an intermediate value is
/// not an object (including `null`).
pub fn get_path<'a>(snapshot: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(snapshot, |current, segment| current.as_object()?.get(segment))
}

/// Returns a copy of `snapshot` with `value` stored at `path`.
///
/// Objects along the path are copied; missing or non-object intermediates are
/// replaced by fresh objects. A non-object root is treated as empty.
pub fn set_path(snapshot: &Value, path: &str, value: Value) -> Value {
    let root = snapshot.as_object().cloned().unwrap_or_default();
    let segments: Vec<&str> = path.split('.').collect();
    Value::Object(assign(root, &segments, value))
}

fn assign(mut node: Map<String, Value>, segments: &[&str], value: Value) -> Map<String, Value> {
    match segments {
        [] => node,
        [last] => {
            node.insert((*last).to_string(), value);
            node
        }
        [head, rest @ ..] => {
            let child = node
                .get(*head)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            node.insert((*head).to_string(), Value::Object(assign(child, rest, value)));
            node
        }
    }
}

/// Joins a parent path and a child key with a dot.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
