//! Standalone traffic filter entity.

pub mod model;

use crate::diagnostics::Diagnostics;
use crate::errors::{Action, ResourceError};
use crate::metrics_defs::FILTER_REMOVED;
use crate::resource::Resource;
use crate::state::State;
use async_trait::async_trait;
use http::StatusCode;
use model::{PlannedChange, TrafficFilterModel};
use serverless_api::types::TrafficFilterInfo;
use serverless_api::{ApiResponse, ServerlessApi};
use shared::counter;
use std::sync::Arc;

pub const TYPE_NAME: &str = "ec_serverless_traffic_filter";

#[derive(Default)]
pub struct TrafficFilterResource {
    client: Option<Arc<dyn ServerlessApi>>,
}

/// Payload of a response carrying `expected`, or the error describing it.
fn expect_info(
    action: Action,
    expected: StatusCode,
    response: ApiResponse<TrafficFilterInfo>,
) -> Result<TrafficFilterInfo, ResourceError> {
    match response.payload {
        Some(info) if response.status == expected => Ok(info),
        _ => Err(ResourceError::unexpected(action, &response)),
    }
}

fn tracked_id(tracked: &TrafficFilterModel) -> Result<&str, ResourceError> {
    tracked.id.as_deref().ok_or(ResourceError::InvalidAttribute {
        attribute: "id",
        message: "traffic filter has no id in state".to_string(),
    })
}

impl TrafficFilterResource {
    pub fn new() -> Self {
        TrafficFilterResource { client: None }
    }

    pub fn with_client(client: Arc<dyn ServerlessApi>) -> Self {
        TrafficFilterResource {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&dyn ServerlessApi, ResourceError> {
        self.client.as_deref().ok_or(ResourceError::Unconfigured)
    }

    async fn create_filter(
        &self,
        plan: &TrafficFilterModel,
    ) -> Result<TrafficFilterModel, ResourceError> {
        let response = self
            .client()?
            .create_traffic_filter(&plan.create_request())
            .await
            .map_err(ResourceError::transport(Action::CreateFilter))?;

        let info = expect_info(Action::CreateFilter, StatusCode::CREATED, response)?;
        tracing::info!(
            traffic_filter_id = %info.id,
            region = %info.region,
            "Created traffic filter"
        );
        Ok(TrafficFilterModel::from_info(&info))
    }

    /// `Ok(None)` when the filter no longer exists.
    async fn read_filter(&self, id: &str) -> Result<Option<TrafficFilterModel>, ResourceError> {
        let response = self
            .client()?
            .get_traffic_filter(id)
            .await
            .map_err(ResourceError::transport(Action::ReadFilter))?;

        if response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let info = expect_info(Action::ReadFilter, StatusCode::OK, response)?;
        Ok(Some(TrafficFilterModel::from_info(&info)))
    }

    async fn update_filter(
        &self,
        plan: &TrafficFilterModel,
        tracked: &TrafficFilterModel,
    ) -> Result<TrafficFilterModel, ResourceError> {
        let replaced = plan.replaced_attributes(tracked);
        if !replaced.is_empty() {
            return Err(ResourceError::RequiresReplacement(replaced));
        }

        let id = tracked_id(tracked)?;
        let response = self
            .client()?
            .patch_traffic_filter(id, &plan.patch_request())
            .await
            .map_err(ResourceError::transport(Action::UpdateFilter))?;

        if response.status == StatusCode::NOT_FOUND {
            return Err(ResourceError::FilterNotFound(id.to_string()));
        }

        let info = expect_info(Action::UpdateFilter, StatusCode::OK, response)?;
        tracing::info!(traffic_filter_id = %info.id, "Updated traffic filter");
        Ok(TrafficFilterModel::from_info(&info))
    }

    async fn delete_filter(&self, id: &str) -> Result<(), ResourceError> {
        let response = self
            .client()?
            .delete_traffic_filter(id)
            .await
            .map_err(ResourceError::transport(Action::DeleteFilter))?;

        match response.status {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                tracing::info!(
                    traffic_filter_id = %id,
                    status = response.status.as_u16(),
                    "Deleted traffic filter"
                );
                Ok(())
            }
            _ => Err(ResourceError::unexpected(Action::DeleteFilter, &response)),
        }
    }
}

#[async_trait]
impl Resource for TrafficFilterResource {
    type Model = TrafficFilterModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    async fn create(
        &self,
        plan: &TrafficFilterModel,
        state: &mut State<TrafficFilterModel>,
    ) -> Diagnostics {
        let mut diags = plan.validate();
        if diags.has_error() {
            return diags;
        }

        match self.create_filter(plan).await {
            Ok(model) => state.set(model),
            Err(e) => diags.push(e.into()),
        }
        diags
    }

    async fn read(&self, state: &mut State<TrafficFilterModel>) -> Diagnostics {
        let Some(tracked) = state.get().cloned() else {
            return Diagnostics::new();
        };

        let result = match tracked_id(&tracked) {
            Ok(id) => self.read_filter(id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(model)) => state.set(model),
            Ok(None) => {
                tracing::info!(
                    traffic_filter_id = ?tracked.id,
                    "Traffic filter not found, removing from state"
                );
                counter!(FILTER_REMOVED).increment(1);
                state.remove_resource();
            }
            Err(e) => return e.into(),
        }
        Diagnostics::new()
    }

    async fn update(
        &self,
        plan: &TrafficFilterModel,
        state: &mut State<TrafficFilterModel>,
    ) -> Diagnostics {
        let mut diags = plan.validate();
        if diags.has_error() {
            return diags;
        }

        let Some(tracked) = state.get().cloned() else {
            diags.push(ResourceError::InvalidAttribute {
                attribute: "id",
                message: "traffic filter is not tracked".to_string(),
            }
            .into());
            return diags;
        };

        if plan.plan_change(&tracked) == PlannedChange::NoChange {
            return diags;
        }

        match self.update_filter(plan, &tracked).await {
            Ok(model) => state.set(model),
            Err(e) => diags.push(e.into()),
        }
        diags
    }

    async fn delete(&self, state: &mut State<TrafficFilterModel>) -> Diagnostics {
        let Some(tracked) = state.get().cloned() else {
            return Diagnostics::new();
        };

        let result = match tracked_id(&tracked) {
            Ok(id) => self.delete_filter(id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                state.remove_resource();
                Diagnostics::new()
            }
            Err(e) => e.into(),
        }
    }

    fn import_state(&self, id: &str, state: &mut State<TrafficFilterModel>) -> Diagnostics {
        state.set(TrafficFilterModel::imported(id));
        Diagnostics::new()
    }
}
