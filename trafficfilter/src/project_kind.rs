use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three kinds of serverless project. Each has its own endpoint and
/// entity type, but they embed traffic filters the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Elasticsearch,
    Observability,
    Security,
}

impl ProjectKind {
    pub const ALL: [ProjectKind; 3] = [
        ProjectKind::Elasticsearch,
        ProjectKind::Observability,
        ProjectKind::Security,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Elasticsearch => "elasticsearch",
            ProjectKind::Observability => "observability",
            ProjectKind::Security => "security",
        }
    }

    /// Capitalised name used in user facing messages.
    pub const fn display_name(&self) -> &'static str {
        match self {
            ProjectKind::Elasticsearch => "Elasticsearch",
            ProjectKind::Observability => "Observability",
            ProjectKind::Security => "Security",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("project_type must be one of: elasticsearch, observability, security. Got: {0}")]
pub struct UnknownProjectKind(pub String);

impl FromStr for ProjectKind {
    type Err = UnknownProjectKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownProjectKind(s.to_string()))
    }
}
