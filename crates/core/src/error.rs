/// Programmer-error guards raised by the validation engine.
///
/// Business-rule violations are never reported through this type; they are
/// recorded as [`BrokenRule`](crate::validation::broken::BrokenRule) entries
/// on the entity.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(
        "EndLoading never called after a BeginLoading call was made. \
         No operations are permitted until EndLoading has been called."
    )]
    Loading,

    #[error("Property not found: {0}")]
    UnknownProperty(String),

    #[error("Wrong rule passed to {rule}: {found}")]
    WrongDescriptor { rule: &'static str, found: &'static str },

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Cannot compare {left} with {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },

    #[error("Invalid regular expression pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Error for a required string argument that is empty or whitespace.
    pub fn blank(name: &'static str) -> Self {
        CoreError::InvalidArgument {
            name,
            reason: "Value cannot be null or white space.".to_string(),
        }
    }
}

/// Return an [`CoreError::InvalidArgument`] when `value` is blank.
pub fn require_non_blank(value: &str, name: &'static str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::blank(name));
    }
    Ok(())
}
