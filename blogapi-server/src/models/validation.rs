//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Required parameter was not supplied
    Required {
        field: &'static str,
        hint: &'static str,
    },

    /// Value doesn't match the required format
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Request body could not be decoded against the schema
    Malformed { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::Required { field, hint } => write!(f, "{} is required: {}", field, hint),
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::Malformed { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for ValidationError {}
