//! Runner error types

use rnaloops_shared::SharedError;
use thiserror::Error;

use crate::core::classifier::ParseError;

#[derive(Error, Debug)]
pub enum RnaLoopsError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Execution failed: {message}")]
    Execution { message: String },

    #[error("unparseable output: {0}")]
    Parsing(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RnaLoopsError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input { message: message.into() }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution { message: message.into() }
    }
}

impl From<SharedError> for RnaLoopsError {
    fn from(err: SharedError) -> Self {
        Self::config(err.to_string())
    }
}

pub type RnaLoopsResult<T> = Result<T, RnaLoopsError>;
