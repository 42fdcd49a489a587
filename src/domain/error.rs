use thiserror::Error;

use super::types::ContentKind;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{kind} entry #{id} not found")]
    NotFound { kind: ContentKind, id: u64 },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("domain invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn not_found(kind: ContentKind, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }
}
