use proptest::prelude::*;
use serde_json::{Value, json};

use form_spec::{
    Condition, FieldKind, FieldMap, FieldSpec, FormSchema, Operator, filter_visible, is_visible,
    resolve_visibility,
};

fn fixture() -> FormSchema {
    FormSchema::from_json_str(include_str!("../tests/fixtures/registration_form.json"))
        .expect("fixture schema")
}

fn keys(fields: &FieldMap) -> Vec<&str> {
    fields.keys().map(String::as_str).collect()
}

#[test]
fn conditional_field_follows_snapshot() {
    let schema = fixture();
    let company = &schema.fields["companyName"];
    assert!(is_visible(company, &json!({ "accountType": "BUSINESS" })));
    assert!(!is_visible(company, &json!({ "accountType": "INDIVIDUAL" })));
    assert!(is_visible(&schema.fields["email"], &json!({})));
}

#[test]
fn filter_drops_hidden_fields_and_keeps_order() {
    let schema = fixture();
    let visible = schema.visible_fields(&json!({ "accountType": "INDIVIDUAL" }));
    assert_eq!(
        keys(&visible),
        vec!["accountType", "email", "age", "tags", "newsletter", "wantsShipping"]
    );
}

#[test]
fn hidden_group_hides_every_descendant() {
    let schema = fixture();
    let snapshot = json!({ "wantsShipping": false, "accountType": "BUSINESS" });
    let visible = schema.visible_fields(&snapshot);
    assert!(!visible.contains_key("address"));

    let map = resolve_visibility(&schema.fields, &snapshot);
    assert_eq!(map.get("address"), Some(&false));
    assert_eq!(map.get("address.city"), Some(&false));
    // The child's own condition holds, but its parent is hidden.
    assert_eq!(map.get("address.deliveryNotes"), Some(&false));
}

#[test]
fn visible_group_is_filtered_recursively() {
    let schema = fixture();
    let snapshot = json!({
        "wantsShipping": true,
        "accountType": "INDIVIDUAL",
        "address": { "city": "Varna" }
    });
    let visible = schema.visible_fields(&snapshot);
    let children = visible["address"].children().expect("group children");
    assert_eq!(keys(children), vec!["city", "region", "postalCode"]);

    let snapshot = json!({
        "wantsShipping": true,
        "accountType": "INDIVIDUAL",
        "address": { "city": "Plovdiv" }
    });
    let visible = schema.visible_fields(&snapshot);
    let children = visible["address"].children().expect("group children");
    assert!(children.contains_key("deliveryNotes"));
}

#[test]
fn filtering_does_not_mutate_the_schema() {
    let schema = fixture();
    let before = schema.clone();
    let _ = schema.visible_fields(&json!({ "wantsShipping": false }));
    assert_eq!(schema, before);
}

fn gated(name: &str, gate: &str, children: Option<FieldMap>) -> (String, FieldSpec) {
    let kind = match children {
        Some(fields) => FieldKind::Group { fields },
        None => FieldKind::Text,
    };
    let mut field = FieldSpec::new(name, kind);
    field.visibility_condition = Some(Condition::rule(gate, Operator::Equals, json!(true)));
    (name.to_string(), field)
}

fn sample_schema() -> FieldMap {
    let inner: FieldMap = [gated("leaf", "b", None), gated("other", "c", None)]
        .into_iter()
        .collect();
    [
        gated("top", "a", None),
        gated("group", "a", Some(inner)),
        ("plain".to_string(), FieldSpec::new("plain", FieldKind::Number)),
    ]
    .into_iter()
    .collect()
}

proptest! {
    #[test]
    fn filtering_is_idempotent(a in any::<bool>(), b in any::<bool>(), c in any::<bool>()) {
        let schema = sample_schema();
        let snapshot: Value = json!({ "a": a, "b": b, "c": c });
        let once = filter_visible(&schema, &snapshot);
        let twice = filter_visible(&once, &snapshot);
        prop_assert_eq!(once, twice);
    }
}
