use std::error::Error as StdError;

use thiserror::Error;

use crate::application::admin::orchestrator::OrchestratorError;
use crate::application::assistant::ChatError;
use crate::application::content::ContentError;
use crate::application::session::AuthError;
use crate::{domain::error::DomainError, infra::error::InfraError};

/// Error chain flattened for display on the command line.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            let message = inner.to_string();
            if messages.last() != Some(&message) {
                messages.push(message);
            }
            current = inner.source();
        }
        Self { source, messages }
    }

    pub fn render(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit code for the command line surface.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Auth(_) => 3,
            AppError::Conflict(_) => 4,
            AppError::Content(err) if err.is_conflict() => 4,
            AppError::Domain(DomainError::NotFound { .. }) | AppError::NotFound(_) => 2,
            AppError::Domain(DomainError::Validation { .. }) | AppError::Validation(_) => 2,
            _ => 1,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}

impl From<OrchestratorError> for AppError {
    fn from(error: OrchestratorError) -> Self {
        match error {
            OrchestratorError::Auth(err) => AppError::Auth(err),
            OrchestratorError::NotFound { kind, id } => {
                AppError::Domain(DomainError::not_found(kind, id))
            }
            other => AppError::unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ContentKind;

    #[test]
    fn exit_codes_distinguish_auth_and_conflicts() {
        assert_eq!(AppError::from(AuthError::NotAuthenticated).exit_code(), 3);
        let conflict = ContentError::Conflict {
            path: "data/projects.json".into(),
        };
        assert_eq!(AppError::from(conflict).exit_code(), 4);
        assert_eq!(
            AppError::from(DomainError::not_found(ContentKind::Blogs, 9)).exit_code(),
            2
        );
        assert_eq!(AppError::conflict("moved").exit_code(), 4);
        assert_eq!(AppError::unexpected("boom").exit_code(), 1);
    }

    #[test]
    fn report_flattens_source_chain() {
        let io = std::io::Error::other("disk full");
        let err = AppError::from(InfraError::from(io));
        let report = err.report();
        assert_eq!(report.messages[0], "io error: disk full");
        assert!(report.render().contains("disk full"));
    }
}
