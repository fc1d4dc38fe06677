pub mod field;
pub mod form;
pub mod validation;

pub use field::{FieldKind, FieldMap, FieldOption, FieldSpec};
pub use form::FormSchema;
pub use validation::{
    ConditionalRule, MessageKey, ValidationFormat, ValidationMessages, ValidationRules,
};
