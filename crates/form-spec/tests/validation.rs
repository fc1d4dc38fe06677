use serde_json::{Value, json};

use form_spec::{
    ErrorKind, FieldKind, FieldSpec, FormSchema, ValidationFormat, ValidationRules, check_format,
    effective_validation, has_conditional_rules, is_effectively_required, merge_conditional,
    validate_all, validate_field,
};

fn fixture() -> FormSchema {
    FormSchema::from_json_str(include_str!("../tests/fixtures/registration_form.json"))
        .expect("fixture schema")
}

fn field_with(kind: FieldKind, validation: Value) -> FieldSpec {
    let mut field = FieldSpec::new("subject", kind);
    field.label = Some("Subject".into());
    field.validation = Some(serde_json::from_value(validation).expect("validation rules"));
    field
}

fn company_field() -> FieldSpec {
    field_with(
        FieldKind::Text,
        json!({
            "conditionalRules": [{
                "condition": { "field": "accountType", "operator": "equals", "value": "BUSINESS" },
                "validation": { "minLength": 5 }
            }]
        }),
    )
}

#[test]
fn conditional_min_length_applies_only_when_condition_holds() {
    let field = company_field();
    let business = json!({ "accountType": "BUSINESS", "companyName": "ABC" });
    let error = validate_field(business.get("companyName"), &field, &business)
        .expect("length error for business accounts");
    assert_eq!(error.kind, ErrorKind::Length);
    assert_eq!(error.message, "Must be at least 5 characters");

    let individual = json!({ "accountType": "INDIVIDUAL", "companyName": "ABC" });
    assert_eq!(
        validate_field(individual.get("companyName"), &field, &individual),
        None
    );
}

#[test]
fn later_conditional_rules_win() {
    let field = field_with(
        FieldKind::Text,
        json!({
            "maxLength": 100,
            "conditionalRules": [
                {
                    "condition": { "field": "plan", "operator": "exists" },
                    "validation": { "maxLength": 20, "messages": { "maxLength": "first", "required": "needed" } }
                },
                {
                    "condition": { "field": "plan", "operator": "equals", "value": "pro" },
                    "validation": { "maxLength": 10, "messages": { "maxLength": "second" } }
                }
            ]
        }),
    );
    let snapshot = json!({ "plan": "pro" });
    let effective = effective_validation(&field, &snapshot);
    assert_eq!(effective.max_length, Some(10));
    let messages = effective.messages.expect("merged messages");
    assert_eq!(messages.max_length.as_deref(), Some("second"));
    assert_eq!(messages.required.as_deref(), Some("needed"));

    let basic = merge_conditional(field.validation.as_ref(), &json!({}));
    assert_eq!(basic.max_length, Some(100));
    assert!(basic.messages.is_none());
}

#[test]
fn merging_never_mutates_base_rules() {
    let field = company_field();
    let before = field.validation.clone();
    let _ = effective_validation(&field, &json!({ "accountType": "BUSINESS" }));
    assert_eq!(field.validation, before);
    assert!(has_conditional_rules(field.validation.as_ref()));
    assert!(!has_conditional_rules(None));
    assert!(!has_conditional_rules(Some(&ValidationRules::default())));
}

#[test]
fn conditional_required_is_ored_with_field_default() {
    let field = field_with(
        FieldKind::Text,
        json!({
            "conditionalRules": [{
                "condition": { "field": "contact", "operator": "equals", "value": "email" },
                "validation": { "required": true, "messages": { "required": "Email is needed for email contact" } }
            }]
        }),
    );
    assert!(!is_effectively_required(&field, &json!({ "contact": "phone" })));
    let snapshot = json!({ "contact": "email" });
    assert!(is_effectively_required(&field, &snapshot));

    let error = validate_field(None, &field, &snapshot).expect("required error");
    assert_eq!(error.kind, ErrorKind::Required);
    assert_eq!(error.message, "Email is needed for email contact");
}

#[test]
fn required_message_names_the_field() {
    let mut field = FieldSpec::new("city", FieldKind::Text);
    field.required = true;
    field.label = Some("City".into());
    for empty in [None, Some(Value::Null), Some(json!("")), Some(json!([]))] {
        let error = validate_field(empty.as_ref(), &field, &json!({})).expect("required");
        assert_eq!(error.kind, ErrorKind::Required);
        assert_eq!(error.message, "City is required");
    }
}

#[test]
fn empty_optional_values_skip_other_checks() {
    let field = field_with(FieldKind::Email, json!({ "minLength": 3, "format": "email" }));
    assert_eq!(validate_field(Some(&json!("")), &field, &json!({})), None);
    assert_eq!(validate_field(None, &field, &json!({})), None);
}

#[test]
fn length_checks_count_characters() {
    let field = field_with(FieldKind::Text, json!({ "maxLength": 3 }));
    assert_eq!(validate_field(Some(&json!("äöü")), &field, &json!({})), None);
    let error = validate_field(Some(&json!("äöüß")), &field, &json!({})).expect("too long");
    assert_eq!(error.kind, ErrorKind::Length);
    assert_eq!(error.message, "Cannot exceed 3 characters");
}

#[test]
fn range_checks_coerce_numeric_strings() {
    let field = field_with(FieldKind::Number, json!({ "min": 18, "max": 120 }));
    let low = validate_field(Some(&json!("17")), &field, &json!({})).expect("below minimum");
    assert_eq!(low.kind, ErrorKind::Range);
    assert_eq!(low.message, "Must be at least 18");

    let high = validate_field(Some(&json!(121)), &field, &json!({})).expect("above maximum");
    assert_eq!(high.message, "Cannot exceed 120");

    assert_eq!(validate_field(Some(&json!("42")), &field, &json!({})), None);
    assert_eq!(validate_field(Some(&json!(18.5)), &field, &json!({})), None);
}

#[test]
fn range_limits_keep_fractions_in_messages() {
    let field = field_with(FieldKind::Number, json!({ "max": 2.5 }));
    let error = validate_field(Some(&json!(3)), &field, &json!({})).expect("above maximum");
    assert_eq!(error.message, "Cannot exceed 2.5");
}

#[test]
fn length_is_checked_before_range() {
    let field = field_with(FieldKind::Text, json!({ "minLength": 4, "max": 10 }));
    let error = validate_field(Some(&json!("99")), &field, &json!({})).expect("error");
    assert_eq!(error.kind, ErrorKind::Length);
}

#[test]
fn pattern_mismatch_uses_override_message() {
    let field = field_with(
        FieldKind::Text,
        json!({ "pattern": "^[A-Z]{3}$", "messages": { "pattern": "Use a three letter code" } }),
    );
    let error = validate_field(Some(&json!("abc")), &field, &json!({})).expect("pattern");
    assert_eq!(error.kind, ErrorKind::Pattern);
    assert_eq!(error.message, "Use a three letter code");
    assert_eq!(validate_field(Some(&json!("ABC")), &field, &json!({})), None);
}

#[test]
fn invalid_patterns_are_skipped() {
    let field = field_with(FieldKind::Text, json!({ "pattern": "([unclosed" }));
    assert_eq!(validate_field(Some(&json!("anything")), &field, &json!({})), None);
}

#[test]
fn format_errors_use_checker_messages() {
    let field = field_with(FieldKind::Email, json!({ "format": "email" }));
    let error = validate_field(Some(&json!("not-an-email")), &field, &json!({})).expect("format");
    assert_eq!(error.kind, ErrorKind::Format);
    assert_eq!(error.message, "Invalid email format");
}

#[test]
fn format_checkers() {
    use ValidationFormat::*;

    assert!(check_format("ana@example.com", Email).is_ok());
    assert!(check_format("ana@example", Email).is_err());
    assert!(check_format("ana @example.com", Email).is_err());

    assert!(check_format("https://example.com/path?q=1", Url).is_ok());
    assert!(check_format("example.com", Url).is_err());

    assert!(check_format("+359 (88) 123-4567", Phone).is_ok());
    assert!(check_format("0888123456", Phone).is_err());
    assert!(check_format("+12345678901234567", Phone).is_err());

    assert!(check_format("2024-02-29", Date).is_ok());
    assert_eq!(check_format("2023-02-29", Date), Err("Invalid date"));
    assert_eq!(
        check_format("2024-2-29", Date),
        Err("Invalid date format (YYYY-MM-DD)")
    );

    assert!(check_format("23:59", Time).is_ok());
    assert!(check_format("09:05", Time).is_ok());
    assert!(check_format("24:00", Time).is_err());
    assert!(check_format("12:60", Time).is_err());

    assert!(check_format("2024-05-01T08:30", Datetime).is_ok());
    assert!(check_format("2024-05-01 08:30", Datetime).is_err());

    assert!(check_format("SW1A 1AA", PostalCode).is_ok());
    assert!(check_format("1000", PostalCode).is_ok());
    assert!(check_format("12", PostalCode).is_err());
    assert!(check_format("12345678901", PostalCode).is_err());

    assert!(check_format("4111 1111 1111 1111", CreditCard).is_ok());
    assert!(check_format("4111-1111-1111", CreditCard).is_err());
}

#[test]
fn validate_all_skips_hidden_fields() {
    let schema = fixture();
    let snapshot = json!({
        "accountType": "INDIVIDUAL",
        "companyName": "X",
        "email": "ana@example.com",
        "wantsShipping": false
    });
    let report = validate_all(&schema.fields, &snapshot);
    assert!(report.valid, "unexpected errors: {:?}", report.errors);
}

#[test]
fn validate_all_reports_nested_paths() {
    let schema = fixture();
    let snapshot = json!({
        "accountType": "BUSINESS",
        "companyName": "ABC",
        "email": "broken",
        "age": "12",
        "wantsShipping": true,
        "address": { "city": "", "postalCode": "!" }
    });
    let report = schema.validate(&snapshot);
    assert!(!report.valid);

    let paths: Vec<&str> = report.errors.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "companyName",
            "email",
            "age",
            "address.city",
            "address.postalCode"
        ]
    );
    assert_eq!(
        report.errors["companyName"].message,
        "Company name needs at least 5 characters"
    );
    assert_eq!(report.errors["address.city"].kind, ErrorKind::Required);
    assert_eq!(report.errors["address.postalCode"].kind, ErrorKind::Format);
}
