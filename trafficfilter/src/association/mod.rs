//! Association between one traffic filter and one serverless project.
//!
//! There is no association entity on the server. Each association is one
//! member of the `traffic_filters` list embedded in the project, and several
//! associations may target the same project. Every operation therefore reads
//! the project's list, changes only its own member and writes the full list
//! back through [`reconciler::Reconciler`]. Writes from independent
//! associations on the same project are last-writer-wins.

pub mod import;
pub mod membership;
pub mod model;
pub mod reconciler;

use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::metrics_defs::MEMBERSHIP_DRIFT;
use crate::project_kind::ProjectKind;
use crate::resource::Resource;
use crate::state::State;
use async_trait::async_trait;
use import::ImportKey;
use membership::{ProjectMembership, membership_for};
use model::AssociationModel;
use reconciler::Reconciler;
use serverless_api::ServerlessApi;
use shared::counter;
use std::sync::Arc;

pub use model::association_id;

pub const TYPE_NAME: &str = "ec_serverless_traffic_filter_association";

pub const DESCRIPTION: &str = "Manages the association between a traffic filter and a serverless \
     project. Do not use this resource together with the `traffic_filters` attribute of the \
     project itself: both write the same list and will overwrite each other.";

#[derive(Default)]
pub struct AssociationResource {
    client: Option<Arc<dyn ServerlessApi>>,
}

impl AssociationResource {
    pub fn new() -> Self {
        AssociationResource { client: None }
    }

    pub fn with_client(client: Arc<dyn ServerlessApi>) -> Self {
        AssociationResource {
            client: Some(client),
        }
    }

    fn membership(&self, kind: ProjectKind) -> Result<Box<dyn ProjectMembership>, ResourceError> {
        let client = self.client.clone().ok_or(ResourceError::Unconfigured)?;
        Ok(membership_for(kind, client))
    }

    async fn create_association(
        &self,
        plan: &AssociationModel,
        diags: &mut Diagnostics,
    ) -> Result<AssociationModel, ResourceError> {
        let membership = self.membership(plan.project_kind()?)?;
        let transition = Reconciler::new(membership.as_ref())
            .ensure_present(&plan.project_id, &plan.traffic_filter_id, diags)
            .await?;
        tracing::info!(
            project_id = %plan.project_id,
            traffic_filter_id = %plan.traffic_filter_id,
            ?transition,
            "Traffic filter association created"
        );

        Ok(plan.clone().with_id())
    }

    /// `Ok(false)` when the association no longer exists server-side.
    async fn association_exists(&self, tracked: &AssociationModel) -> Result<bool, ResourceError> {
        let kind = tracked.project_kind()?;
        let membership = self.membership(kind)?;

        match Reconciler::new(membership.as_ref())
            .is_present(&tracked.project_id, &tracked.traffic_filter_id)
            .await
        {
            Ok(present) => Ok(present),
            Err(ResourceError::ProjectNotFound { .. }) => {
                tracing::info!(
                    project_type = %kind,
                    project_id = %tracked.project_id,
                    "Project not found, dropping traffic filter association"
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_association(
        &self,
        tracked: &AssociationModel,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        let membership = self.membership(tracked.project_kind()?)?;
        let transition = Reconciler::new(membership.as_ref())
            .ensure_absent(&tracked.project_id, &tracked.traffic_filter_id, diags)
            .await?;
        tracing::info!(
            project_id = %tracked.project_id,
            traffic_filter_id = %tracked.traffic_filter_id,
            ?transition,
            "Traffic filter association deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl Resource for AssociationResource {
    type Model = AssociationModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(
        &self,
        plan: &AssociationModel,
        state: &mut State<AssociationModel>,
    ) -> Diagnostics {
        let mut diags = plan.validate();
        if diags.has_error() {
            return diags;
        }

        match self.create_association(plan, &mut diags).await {
            Ok(model) => state.set(model),
            Err(e) => diags.push(e.into()),
        }
        diags
    }

    async fn read(&self, state: &mut State<AssociationModel>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(tracked) = state.get().cloned() else {
            return diags;
        };

        match self.association_exists(&tracked).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    project_type = %tracked.project_type,
                    project_id = %tracked.project_id,
                    traffic_filter_id = %tracked.traffic_filter_id,
                    "Traffic filter no longer associated with project, removing from state"
                );
                counter!(MEMBERSHIP_DRIFT, "project_type" => tracked.project_type.clone())
                    .increment(1);
                state.remove_resource();
            }
            Err(e) => diags.push(e.into()),
        }
        diags
    }

    async fn update(
        &self,
        _plan: &AssociationModel,
        _state: &mut State<AssociationModel>,
    ) -> Diagnostics {
        ResourceError::UpdateNotSupported.into()
    }

    async fn delete(&self, state: &mut State<AssociationModel>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(tracked) = state.get().cloned() else {
            return diags;
        };

        match self.delete_association(&tracked, &mut diags).await {
            Ok(()) => state.remove_resource(),
            Err(e) => diags.push(e.into()),
        }
        diags
    }

    fn import_state(&self, id: &str, state: &mut State<AssociationModel>) -> Diagnostics {
        match id.parse::<ImportKey>() {
            Ok(key) => {
                state.set(key.into());
                Diagnostics::new()
            }
            Err(e) => ResourceError::from(e).into(),
        }
    }
}
