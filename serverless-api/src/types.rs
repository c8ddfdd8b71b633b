use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a traffic filter as embedded in a project record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrafficFilter {
    pub id: String,
}

impl TrafficFilter {
    pub fn new<I: Into<String>>(id: I) -> Self {
        TrafficFilter { id: id.into() }
    }
}

pub type TrafficFilters = Vec<TrafficFilter>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficFilterType {
    #[default]
    Ip,
    Vpce,
}

impl TrafficFilterType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrafficFilterType::Ip => "ip",
            TrafficFilterType::Vpce => "vpce",
        }
    }
}

impl fmt::Display for TrafficFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficFilterRule {
    /// IP address, CIDR mask or VPC endpoint id.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A traffic filter as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficFilterInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: TrafficFilterType,
    pub region: String,
    #[serde(default)]
    pub include_by_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<TrafficFilterRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateTrafficFilterRequest {
    pub name: String,
    pub region: String,
    #[serde(rename = "type")]
    pub filter_type: TrafficFilterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_by_default: Option<bool>,
    /// Omitted entirely when no rules are managed, which the API treats
    /// differently from an explicitly empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<TrafficFilterRule>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PatchTrafficFilterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_by_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<TrafficFilterRule>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticsearchProject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filters: Option<TrafficFilters>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityProject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filters: Option<TrafficFilters>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityProject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_features_package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_filters: Option<TrafficFilters>,
}

// Patch bodies carry only the filter list. An empty list detaches every
// filter and is serialized as `[]`.

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatchElasticsearchProjectRequest {
    pub traffic_filters: Option<TrafficFilters>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatchObservabilityProjectRequest {
    pub traffic_filters: Option<TrafficFilters>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatchSecurityProjectRequest {
    pub traffic_filters: Option<TrafficFilters>,
}
