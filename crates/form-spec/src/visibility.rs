use serde_json::Value;

use crate::condition::evaluate;
use crate::path::join_path;
use crate::spec::field::{FieldKind, FieldMap, FieldSpec};

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Whether the field's own visibility condition holds for `snapshot`.
pub fn is_visible(field: &FieldSpec, snapshot: &Value) -> bool {
    evaluate(field.visibility_condition.as_ref(), snapshot)
}

/// Returns a copy of `fields` holding only the currently visible fields.
///
/// A hidden group is dropped with its whole subtree; the conditions of its
/// children are not consulted.
pub fn filter_visible(fields: &FieldMap, snapshot: &Value) -> FieldMap {
    fields
        .iter()
        .filter(|(key, field)| {
            let visible = is_visible(field, snapshot);
            if !visible {
                tracing::debug!(field = %key, "field hidden by visibility condition");
            }
            visible
        })
        .map(|(key, field)| {
            let kept = match &field.kind {
                FieldKind::Group { fields: children } => FieldSpec {
                    kind: FieldKind::Group {
                        fields: filter_visible(children, snapshot),
                    },
                    ..field.clone()
                },
                _ => field.clone(),
            };
            (key.clone(), kept)
        })
        .collect()
}

/// Visibility of every field in the tree, keyed by dotted path.
///
/// Descendants of a hidden group are reported hidden.
pub fn resolve_visibility(fields: &FieldMap, snapshot: &Value) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    collect_visibility(fields, snapshot, "", true, &mut map);
    map
}

fn collect_visibility(
    fields: &FieldMap,
    snapshot: &Value,
    prefix: &str,
    parent_visible: bool,
    map: &mut VisibilityMap,
) {
    for (key, field) in fields {
        let path = join_path(prefix, key);
        let visible = parent_visible && is_visible(field, snapshot);
        if let Some(children) = field.children() {
            collect_visibility(children, snapshot, &path, visible, map);
        }
        map.insert(path, visible);
    }
}
