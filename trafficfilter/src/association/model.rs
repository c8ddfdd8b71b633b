use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::ResourceError;
use crate::project_kind::ProjectKind;
use serde::{Deserialize, Serialize};

/// Identity of an association: `<project_id>-<traffic_filter_id>`.
///
/// The project kind is not part of it, so the same project id and filter id
/// under two kinds map to the same identity. The format is kept as is since
/// existing state depends on it.
pub fn association_id(project_id: &str, traffic_filter_id: &str) -> String {
    format!("{project_id}-{traffic_filter_id}")
}

/// Every attribute except `id` forces replacement when changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project_id: String,
    /// Kept as declared; checked against the known kinds on every operation.
    pub project_type: String,
    pub traffic_filter_id: String,
}

impl AssociationModel {
    pub fn new<P, K, F>(project_id: P, project_type: K, traffic_filter_id: F) -> Self
    where
        P: Into<String>,
        K: Into<String>,
        F: Into<String>,
    {
        AssociationModel {
            id: None,
            project_id: project_id.into(),
            project_type: project_type.into(),
            traffic_filter_id: traffic_filter_id.into(),
        }
    }

    pub fn with_id(mut self) -> Self {
        self.id = Some(association_id(&self.project_id, &self.traffic_filter_id));
        self
    }

    pub fn project_kind(&self) -> Result<ProjectKind, ResourceError> {
        Ok(self.project_type.parse()?)
    }

    /// Checks every attribute and reports all problems at once.
    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();

        if self.project_id.is_empty() {
            diags.push(Diagnostic::from(ResourceError::InvalidAttribute {
                attribute: "project_id",
                message: "must not be empty".to_string(),
            }));
        }

        if let Err(err) = self.project_kind() {
            diags.push(err.into());
        }

        if self.traffic_filter_id.is_empty() {
            diags.push(Diagnostic::from(ResourceError::InvalidAttribute {
                attribute: "traffic_filter_id",
                message: "must not be empty".to_string(),
            }));
        }

        diags
    }
}
