//! Shared error types for the rnaloops workspace

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Unknown algorithm: {name}")]
    UnknownAlgorithm { name: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

impl SharedError {
    /// Build an invalid-option error for the given field
    pub fn invalid(field: &str, value: impl ToString) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
