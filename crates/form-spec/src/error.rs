use thiserror::Error;

/// Errors raised while accepting a schema document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("schema rejected: {}", .0.join("; "))]
    InvalidSchema(Vec<String>),
    #[error("schema does not match the field model: {0}")]
    Model(#[source] serde_json::Error),
}
