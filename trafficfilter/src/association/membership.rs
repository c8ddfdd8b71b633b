//! Access to the `traffic_filters` list embedded in each kind of project.
//!
//! The three project kinds expose the list through separate endpoints and
//! entity types. [`ProjectMembership`] hides that behind two calls so the
//! reconciliation logic exists once.

use crate::errors::{Action, ResourceError};
use crate::project_kind::ProjectKind;
use async_trait::async_trait;
use http::StatusCode;
use indexmap::IndexSet;
use serverless_api::types::{
    ElasticsearchProject, ObservabilityProject, PatchElasticsearchProjectRequest,
    PatchObservabilityProjectRequest, PatchSecurityProjectRequest, SecurityProject, TrafficFilter,
    TrafficFilters,
};
use serverless_api::{ApiResponse, ServerlessApi};
use std::sync::Arc;

/// Filter ids attached to a project.
///
/// Iteration order follows the server's list, so a written list differs from
/// the list that was read only by the member being added or removed.
/// Equality ignores order.
pub type MembershipSet = IndexSet<String>;

pub fn membership_from_filters(filters: Option<TrafficFilters>) -> MembershipSet {
    filters
        .unwrap_or_default()
        .into_iter()
        .map(|filter| filter.id)
        .collect()
}

pub fn filters_from_membership(members: &MembershipSet) -> TrafficFilters {
    members.iter().map(TrafficFilter::new).collect()
}

#[async_trait]
pub trait ProjectMembership: Send + Sync {
    fn kind(&self) -> ProjectKind;

    /// Current filter ids of the project. A missing project is
    /// `ResourceError::ProjectNotFound`.
    async fn get_membership(&self, project_id: &str) -> Result<MembershipSet, ResourceError>;

    /// Overwrites the project's filter list with `members` and returns the
    /// membership the server reports afterwards.
    async fn patch_membership(
        &self,
        project_id: &str,
        members: &MembershipSet,
    ) -> Result<MembershipSet, ResourceError>;
}

pub fn membership_for(
    kind: ProjectKind,
    client: Arc<dyn ServerlessApi>,
) -> Box<dyn ProjectMembership> {
    match kind {
        ProjectKind::Elasticsearch => Box::new(ElasticsearchMembership { client }),
        ProjectKind::Observability => Box::new(ObservabilityMembership { client }),
        ProjectKind::Security => Box::new(SecurityMembership { client }),
    }
}

fn membership_from_response<P>(
    kind: ProjectKind,
    project_id: &str,
    action: Action,
    response: ApiResponse<P>,
    traffic_filters: impl FnOnce(P) -> Option<TrafficFilters>,
) -> Result<MembershipSet, ResourceError> {
    if response.status == StatusCode::NOT_FOUND {
        return Err(ResourceError::ProjectNotFound {
            kind,
            project_id: project_id.to_string(),
        });
    }

    let Some(project) = response.payload else {
        return Err(ResourceError::unexpected(action, &response));
    };
    Ok(membership_from_filters(traffic_filters(project)))
}

pub struct ElasticsearchMembership {
    client: Arc<dyn ServerlessApi>,
}

#[async_trait]
impl ProjectMembership for ElasticsearchMembership {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Elasticsearch
    }

    async fn get_membership(&self, project_id: &str) -> Result<MembershipSet, ResourceError> {
        let response = self
            .client
            .get_elasticsearch_project(project_id)
            .await
            .map_err(ResourceError::transport(Action::ReadProject))?;

        membership_from_response(
            self.kind(),
            project_id,
            Action::ReadProject,
            response,
            |project: ElasticsearchProject| project.traffic_filters,
        )
    }

    async fn patch_membership(
        &self,
        project_id: &str,
        members: &MembershipSet,
    ) -> Result<MembershipSet, ResourceError> {
        let request = PatchElasticsearchProjectRequest {
            traffic_filters: Some(filters_from_membership(members)),
        };
        let response = self
            .client
            .patch_elasticsearch_project(project_id, &request)
            .await
            .map_err(ResourceError::transport(Action::UpdateProject))?;

        membership_from_response(
            self.kind(),
            project_id,
            Action::UpdateProject,
            response,
            |project: ElasticsearchProject| project.traffic_filters,
        )
    }
}

pub struct ObservabilityMembership {
    client: Arc<dyn ServerlessApi>,
}

#[async_trait]
impl ProjectMembership for ObservabilityMembership {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Observability
    }

    async fn get_membership(&self, project_id: &str) -> Result<MembershipSet, ResourceError> {
        let response = self
            .client
            .get_observability_project(project_id)
            .await
            .map_err(ResourceError::transport(Action::ReadProject))?;

        membership_from_response(
            self.kind(),
            project_id,
            Action::ReadProject,
            response,
            |project: ObservabilityProject| project.traffic_filters,
        )
    }

    async fn patch_membership(
        &self,
        project_id: &str,
        members: &MembershipSet,
    ) -> Result<MembershipSet, ResourceError> {
        let request = PatchObservabilityProjectRequest {
            traffic_filters: Some(filters_from_membership(members)),
        };
        let response = self
            .client
            .patch_observability_project(project_id, &request)
            .await
            .map_err(ResourceError::transport(Action::UpdateProject))?;

        membership_from_response(
            self.kind(),
            project_id,
            Action::UpdateProject,
            response,
            |project: ObservabilityProject| project.traffic_filters,
        )
    }
}

pub struct SecurityMembership {
    client: Arc<dyn ServerlessApi>,
}

#[async_trait]
impl ProjectMembership for SecurityMembership {
    fn kind(&self) -> ProjectKind {
        ProjectKind::Security
    }

    async fn get_membership(&self, project_id: &str) -> Result<MembershipSet, ResourceError> {
        let response = self
            .client
            .get_security_project(project_id)
            .await
            .map_err(ResourceError::transport(Action::ReadProject))?;

        membership_from_response(
            self.kind(),
            project_id,
            Action::ReadProject,
            response,
            |project: SecurityProject| project.traffic_filters,
        )
    }

    async fn patch_membership(
        &self,
        project_id: &str,
        members: &MembershipSet,
    ) -> Result<MembershipSet, ResourceError> {
        let request = PatchSecurityProjectRequest {
            traffic_filters: Some(filters_from_membership(members)),
        };
        let response = self
            .client
            .patch_security_project(project_id, &request)
            .await
            .map_err(ResourceError::transport(Action::UpdateProject))?;

        membership_from_response(
            self.kind(),
            project_id,
            Action::UpdateProject,
            response,
            |project: SecurityProject| project.traffic_filters,
        )
    }
}
