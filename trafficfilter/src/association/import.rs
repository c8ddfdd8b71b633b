use crate::association::model::AssociationModel;
use crate::project_kind::{ProjectKind, UnknownProjectKind};
use std::str::FromStr;

/// External key of an association: `<project_id>,<project_type>,<traffic_filter_id>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportKey {
    pub project_id: String,
    pub project_kind: ProjectKind,
    pub traffic_filter_id: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportKeyError {
    #[error("Expected format: project_id,project_type,traffic_filter_id. Got: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    InvalidProjectType(#[from] UnknownProjectKind),
}

impl ImportKeyError {
    pub fn summary(&self) -> &'static str {
        match self {
            ImportKeyError::InvalidFormat(_) => "Invalid import ID",
            ImportKeyError::InvalidProjectType(_) => "Invalid project type",
        }
    }
}

impl FromStr for ImportKey {
    type Err = ImportKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = key.split(',').collect();
        let [project_id, project_type, traffic_filter_id] = parts.as_slice() else {
            return Err(ImportKeyError::InvalidFormat(key.to_string()));
        };

        if [project_id, project_type, traffic_filter_id]
            .iter()
            .any(|part| part.is_empty())
        {
            return Err(ImportKeyError::InvalidFormat(key.to_string()));
        }

        Ok(ImportKey {
            project_id: project_id.to_string(),
            project_kind: project_type.parse()?,
            traffic_filter_id: traffic_filter_id.to_string(),
        })
    }
}

impl From<ImportKey> for AssociationModel {
    fn from(key: ImportKey) -> Self {
        AssociationModel::new(key.project_id, key.project_kind.as_str(), key.traffic_filter_id)
            .with_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_key() {
        let key: ImportKey = "proj1,elasticsearch,filt1".parse().unwrap();
        assert_eq!(
            key,
            ImportKey {
                project_id: "proj1".into(),
                project_kind: ProjectKind::Elasticsearch,
                traffic_filter_id: "filt1".into(),
            }
        );

        let model = AssociationModel::from(key);
        assert_eq!(model.id.as_deref(), Some("proj1-filt1"));
        assert_eq!(model.project_type, "elasticsearch");
    }

    #[test]
    fn test_wrong_component_count() {
        for key in ["proj1,filt1", "proj1", "", "a,security,b,c"] {
            let err = key.parse::<ImportKey>().unwrap_err();
            assert_eq!(err, ImportKeyError::InvalidFormat(key.to_string()));
            assert_eq!(err.summary(), "Invalid import ID");
        }
    }

    #[test]
    fn test_empty_component() {
        for key in [",security,filt1", "proj1,,filt1", "proj1,security,"] {
            assert!(matches!(
                key.parse::<ImportKey>(),
                Err(ImportKeyError::InvalidFormat(_))
            ));
        }
    }

    #[test]
    fn test_unknown_project_type() {
        let err = "proj1,bogus,filt1".parse::<ImportKey>().unwrap_err();
        assert_eq!(
            err,
            ImportKeyError::InvalidProjectType(UnknownProjectKind("bogus".into()))
        );
        assert_eq!(err.summary(), "Invalid project type");
        assert_eq!(
            err.to_string(),
            "project_type must be one of: elasticsearch, observability, security. Got: bogus"
        );
    }
}
