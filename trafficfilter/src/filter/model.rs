use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::ResourceError;
use serde::{Deserialize, Serialize};
use serverless_api::types::{
    CreateTrafficFilterRequest, PatchTrafficFilterRequest, TrafficFilterInfo, TrafficFilterRule,
    TrafficFilterType,
};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrafficFilterRuleModel {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&TrafficFilterRule> for TrafficFilterRuleModel {
    fn from(rule: &TrafficFilterRule) -> Self {
        TrafficFilterRuleModel {
            source: rule.source.clone(),
            description: rule.description.clone(),
        }
    }
}

impl From<&TrafficFilterRuleModel> for TrafficFilterRule {
    fn from(rule: &TrafficFilterRuleModel) -> Self {
        TrafficFilterRule {
            source: rule.source.clone(),
            description: rule.description.clone(),
        }
    }
}

/// Declared or tracked traffic filter.
///
/// `region` and `type` cannot change after creation. `rules` is `None` when
/// the filter's rules are not managed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficFilterModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub filter_type: TrafficFilterType,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub include_by_default: bool,
    #[serde(rename = "rule", default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<TrafficFilterRuleModel>>,
}

/// How a tracked filter has to change to match its plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannedChange {
    NoChange,
    Update,
    Replace(Vec<&'static str>),
}

impl TrafficFilterModel {
    /// State right after import: only the id is known until the next read.
    pub fn imported(id: &str) -> Self {
        TrafficFilterModel {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let mut invalid = |attribute, message: &str| {
            diags.push(Diagnostic::from(ResourceError::InvalidAttribute {
                attribute,
                message: message.to_string(),
            }))
        };

        if self.name.is_empty() {
            invalid("name", "must not be empty");
        }
        if self.region.is_empty() {
            invalid("region", "must not be empty");
        }
        if let Some(rules) = &self.rules {
            if rules.is_empty() {
                invalid("rule", "at least one rule is required when rules are managed");
            }
            if rules.iter().any(|rule| rule.source.is_empty()) {
                invalid("rule.source", "must not be empty");
            }
        }

        diags
    }

    pub fn from_info(info: &TrafficFilterInfo) -> Self {
        let rules = (!info.rules.is_empty())
            .then(|| info.rules.iter().map(TrafficFilterRuleModel::from).collect());

        TrafficFilterModel {
            id: Some(info.id.clone()),
            name: info.name.clone(),
            filter_type: info.filter_type,
            region: info.region.clone(),
            description: info.description.clone().filter(|d| !d.is_empty()),
            include_by_default: info.include_by_default,
            rules,
        }
    }

    fn api_rules(&self) -> Option<Vec<TrafficFilterRule>> {
        self.rules
            .as_ref()
            .filter(|rules| !rules.is_empty())
            .map(|rules| rules.iter().map(TrafficFilterRule::from).collect())
    }

    pub fn create_request(&self) -> CreateTrafficFilterRequest {
        CreateTrafficFilterRequest {
            name: self.name.clone(),
            region: self.region.clone(),
            filter_type: self.filter_type,
            description: self.description.clone(),
            include_by_default: Some(self.include_by_default),
            rules: self.api_rules(),
        }
    }

    pub fn patch_request(&self) -> PatchTrafficFilterRequest {
        PatchTrafficFilterRequest {
            name: Some(self.name.clone()),
            description: self.description.clone(),
            include_by_default: Some(self.include_by_default),
            rules: self.api_rules(),
        }
    }

    /// Attributes that differ from `tracked` and cannot be changed in place.
    pub fn replaced_attributes(&self, tracked: &TrafficFilterModel) -> Vec<&'static str> {
        let mut replaced = Vec::new();
        if self.region != tracked.region {
            replaced.push("region");
        }
        if self.filter_type != tracked.filter_type {
            replaced.push("type");
        }
        replaced
    }

    pub fn plan_change(&self, tracked: &TrafficFilterModel) -> PlannedChange {
        let replaced = self.replaced_attributes(tracked);
        if !replaced.is_empty() {
            return PlannedChange::Replace(replaced);
        }

        let unchanged = self.name == tracked.name
            && self.description == tracked.description
            && self.include_by_default == tracked.include_by_default
            && sorted_rules(&self.rules) == sorted_rules(&tracked.rules);

        if unchanged {
            PlannedChange::NoChange
        } else {
            PlannedChange::Update
        }
    }
}

fn sorted_rules(rules: &Option<Vec<TrafficFilterRuleModel>>) -> Vec<&TrafficFilterRuleModel> {
    let mut sorted: Vec<_> = rules.iter().flatten().collect();
    sorted.sort();
    sorted
}
