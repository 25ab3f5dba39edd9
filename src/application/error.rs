//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add resolution-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("upstream response is missing {what}")]
    MissingData { what: String },

    #[error("invalid subject data: {message}")]
    InvalidSubject { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("upstream request failed while {context}")]
    Upstream {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn upstream(context: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ApplicationError::Upstream {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
