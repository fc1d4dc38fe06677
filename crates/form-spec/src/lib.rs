#![allow(missing_docs)]

pub mod autofill;
pub mod condition;
pub mod draft;
pub mod error;
pub mod formats;
pub mod path;
pub mod report;
pub mod schema_check;
pub mod spec;
pub mod structure;
pub mod validate;
pub mod visibility;

pub use autofill::{
    AutoFillOutcome, AutoFillSpec, AutoFillTicket, AutoFillTracker, AutoFillTrigger,
};
pub use condition::{Condition, ConditionRule, Logic, Operator, evaluate};
pub use draft::{
    CUSTOM_SCHEMA_KEY, DraftError, DraftRecord, DraftStore, FORM_VALUES_KEY, MemoryDraftStore,
    ensure_valid_key,
};
pub use error::SpecError;
pub use formats::check_format;
pub use path::{get_path, set_path};
pub use report::{ErrorKind, FieldError, RequiredCheck, ValidationReport};
pub use schema_check::{SchemaCheck, check_schema, parse_json};
pub use spec::{
    ConditionalRule, FieldKind, FieldMap, FieldOption, FieldSpec, FormSchema, MessageKey,
    ValidationFormat, ValidationMessages, ValidationRules,
};
pub use structure::{Submission, check_required, coerce, find_missing_required, structure};
pub use validate::{
    effective_validation, has_conditional_rules, is_effectively_required, is_empty_value,
    merge_conditional, validate_all, validate_field,
};
pub use visibility::{VisibilityMap, filter_visible, is_visible, resolve_visibility};
