use crate::association::import::ImportKeyError;
use crate::diagnostics::Diagnostic;
use crate::project_kind::{ProjectKind, UnknownProjectKind};
use serverless_api::{ApiError, ApiResponse};
use std::fmt;

/// The API interaction an error happened in. Used as the diagnostic summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ReadProject,
    UpdateProject,
    CreateFilter,
    ReadFilter,
    UpdateFilter,
    DeleteFilter,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::ReadProject => "Failed to read project",
            Action::UpdateProject => "Failed to update project",
            Action::CreateFilter => "Failed to create traffic filter",
            Action::ReadFilter => "Failed to read traffic filter",
            Action::UpdateFilter => "Failed to update traffic filter",
            Action::DeleteFilter => "Failed to delete traffic filter",
        };
        f.write_str(s)
    }
}

/// Broad classes of failure. None of them is retried by the resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    InvalidInput,
    TransportFailure,
    UnexpectedResponse,
    LogicError,
}

#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error("{} project {project_id} not found", .kind.display_name())]
    ProjectNotFound {
        kind: ProjectKind,
        project_id: String,
    },

    #[error("traffic filter {0} not found")]
    FilterNotFound(String),

    #[error(transparent)]
    InvalidProjectType(#[from] UnknownProjectKind),

    #[error(transparent)]
    InvalidImportKey(#[from] ImportKeyError),

    #[error("{attribute}: {message}")]
    InvalidAttribute {
        attribute: &'static str,
        message: String,
    },

    #[error("{action}: {source}")]
    Transport {
        action: Action,
        #[source]
        source: ApiError,
    },

    #[error("{action}: the API request failed with: {status_line}")]
    UnexpectedResponse {
        action: Action,
        status_line: String,
        body: String,
    },

    #[error("update not supported: all attributes of this resource require replacement")]
    UpdateNotSupported,

    #[error("attributes require replacement and cannot be updated in place: {}", .0.join(", "))]
    RequiresReplacement(Vec<&'static str>),

    #[error("API client not configured")]
    Unconfigured,
}

impl ResourceError {
    pub fn transport(action: Action) -> impl FnOnce(ApiError) -> ResourceError {
        move |source| ResourceError::Transport { action, source }
    }

    pub fn unexpected<T>(action: Action, response: &ApiResponse<T>) -> ResourceError {
        ResourceError::UnexpectedResponse {
            action,
            status_line: response.status_line(),
            body: response.body_text().into_owned(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ResourceError::ProjectNotFound { .. } | ResourceError::FilterNotFound(_) => {
                ErrorCategory::NotFound
            }
            ResourceError::InvalidProjectType(_)
            | ResourceError::InvalidImportKey(_)
            | ResourceError::InvalidAttribute { .. } => ErrorCategory::InvalidInput,
            ResourceError::Transport { .. } => ErrorCategory::TransportFailure,
            ResourceError::UnexpectedResponse { .. } => ErrorCategory::UnexpectedResponse,
            ResourceError::UpdateNotSupported
            | ResourceError::RequiresReplacement(_)
            | ResourceError::Unconfigured => ErrorCategory::LogicError,
        }
    }
}

impl From<ResourceError> for Diagnostic {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::ProjectNotFound { .. } => {
                Diagnostic::error("Project not found", err.to_string())
            }
            ResourceError::FilterNotFound(_) => {
                Diagnostic::error("Traffic filter not found", err.to_string())
            }
            ResourceError::InvalidProjectType(_) => {
                Diagnostic::error("Invalid project type", err.to_string())
            }
            ResourceError::InvalidImportKey(ref e) => Diagnostic::error(e.summary(), e.to_string()),
            ResourceError::InvalidAttribute { .. } => {
                Diagnostic::error("Invalid attribute value", err.to_string())
            }
            ResourceError::Transport { action, source } => {
                Diagnostic::error(action.to_string(), source.to_string())
            }
            ResourceError::UnexpectedResponse {
                action,
                status_line,
                body,
            } => Diagnostic::error(
                action.to_string(),
                format!("The API request failed with: {status_line}\n{body}"),
            ),
            ResourceError::UpdateNotSupported => Diagnostic::error(
                "Update not supported",
                "All attributes of this resource require replacement, so an in-place update \
                 should never be requested. This is a bug in the lifecycle driver.",
            ),
            ResourceError::RequiresReplacement(_) => Diagnostic::error(
                "Replacement required",
                format!(
                    "{err}. The resource must be destroyed and recreated; an in-place update \
                     request indicates a bug in the lifecycle driver."
                ),
            ),
            ResourceError::Unconfigured => Diagnostic::error(
                "Unconfigured API Client",
                "Expected configured API client. \
                 Please report this issue to the provider developers.",
            ),
        }
    }
}
