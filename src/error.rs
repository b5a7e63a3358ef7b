use thiserror::Error;

/// Rejected decision request. Nothing is mutated when this is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {0} must be a number")]
    NotNumeric(&'static str),

    #[error("Invalid system state: {0}")]
    OutOfRange(#[from] validator::ValidationErrors),
}
