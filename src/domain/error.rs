use serde::Serialize;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("field {} is a required field", field),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid input: {}", describe_fields(.0))]
    InvalidInput(Vec<FieldError>),
    #[error("Compiler service unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Compiler service protocol error: {0}")]
    UpstreamProtocolError(String),
    #[error("User with this mail already exists")]
    DuplicateUser,
    #[error("User not found")]
    UserNotFound,
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects a `required` error for every blank value, in the order given.
pub fn require_non_empty(fields: &[(&str, &str)]) -> Result<(), DomainError> {
    let failed: Vec<FieldError> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| FieldError::required(name))
        .collect();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(failed))
    }
}
