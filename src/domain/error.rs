use thiserror::Error;

/// Rejection of malformed input at the write or query boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} has the wrong type: {value:?} ({reason})")]
    WrongType {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Field {field} is out of range: {reason}")]
    OutOfDomain { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn wrong_type(field: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::WrongType {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn out_of_domain(field: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfDomain {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::WrongType { field, .. } => field,
            Self::OutOfDomain { field, .. } => field,
        }
    }
}
