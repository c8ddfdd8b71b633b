//! Runs one lifecycle operation the way a declarative driver would and
//! reports the resulting state and diagnostics.

use crate::cli::{AssociationArgs, AssociationCommand, Command, FilterCommand, ProjectCommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serverless_api::ServerlessApi;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trafficfilter::association::model::AssociationModel;
use trafficfilter::filter::model::TrafficFilterModel;
use trafficfilter::project_filters::read_project_filters;
use trafficfilter::{
    AssociationResource, Diagnostics, ProjectKind, Resource, ResourceError, Severity, State,
    TrafficFilterResource,
};

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("could not open model file {path}: {source}")]
    OpenModel {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse model file {path}: {source}")]
    ParseModel {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("could not encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub resource: &'static str,
    pub state: Option<serde_json::Value>,
    pub diagnostics: Diagnostics,
}

impl Report {
    fn new<M: Serialize>(
        resource: &'static str,
        state: State<M>,
        diagnostics: Diagnostics,
    ) -> Result<Self, DriverError> {
        let state = state
            .into_inner()
            .map(serde_json::to_value)
            .transpose()?;

        Ok(Report {
            resource,
            state,
            diagnostics,
        })
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }

    pub fn log_diagnostics(&self) {
        for diag in self.diagnostics.iter() {
            match diag.severity {
                Severity::Error => tracing::error!(
                    resource = self.resource,
                    summary = %diag.summary,
                    detail = %diag.detail,
                    "Operation failed"
                ),
                Severity::Warning => tracing::warn!(
                    resource = self.resource,
                    summary = %diag.summary,
                    detail = %diag.detail,
                    "Operation reported a warning"
                ),
            }
        }
    }

    pub fn to_json(&self) -> Result<String, DriverError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn load_model<M: DeserializeOwned>(path: &Path) -> Result<M, DriverError> {
    let file = File::open(path).map_err(|source| DriverError::OpenModel {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_reader(file).map_err(|source| DriverError::ParseModel {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn execute(
    client: Arc<dyn ServerlessApi>,
    command: Command,
) -> Result<Report, DriverError> {
    match command {
        Command::Filter(command) => {
            let resource = TrafficFilterResource::with_client(client);
            run_filter(&resource, command).await
        }
        Command::Association(command) => {
            let resource = AssociationResource::with_client(client);
            run_association(&resource, command).await
        }
        Command::Project(ProjectCommand::Filters {
            project_id,
            project_type,
        }) => project_filters(client, &project_id, &project_type).await,
    }
}

async fn run_filter<R>(resource: &R, command: FilterCommand) -> Result<Report, DriverError>
where
    R: Resource<Model = TrafficFilterModel>,
{
    let type_name = resource.type_name();

    match command {
        FilterCommand::Create { file } => {
            let plan: TrafficFilterModel = load_model(&file)?;
            let mut state = State::empty();
            let diags = resource.create(&plan, &mut state).await;
            Report::new(type_name, state, diags)
        }
        FilterCommand::Read { id } => {
            let mut state = State::new(TrafficFilterModel::imported(&id));
            let diags = resource.read(&mut state).await;
            Report::new(type_name, state, diags)
        }
        FilterCommand::Update { id, file } => {
            let mut plan: TrafficFilterModel = load_model(&file)?;
            plan.id = Some(id.clone());

            let mut state = State::new(TrafficFilterModel::imported(&id));
            let mut diags = resource.read(&mut state).await;
            if diags.has_error() {
                return Report::new(type_name, state, diags);
            }
            if state.is_removed() {
                diags.push(ResourceError::FilterNotFound(id).into());
                return Report::new(type_name, state, diags);
            }

            diags.append(resource.update(&plan, &mut state).await);
            Report::new(type_name, state, diags)
        }
        FilterCommand::Delete { id } => {
            let mut state = State::new(TrafficFilterModel::imported(&id));
            let diags = resource.delete(&mut state).await;
            Report::new(type_name, state, diags)
        }
        FilterCommand::Import { id } => import_and_read(resource, &id).await,
    }
}

async fn run_association<R>(
    resource: &R,
    command: AssociationCommand,
) -> Result<Report, DriverError>
where
    R: Resource<Model = AssociationModel>,
{
    let type_name = resource.type_name();
    let tracked = |args: AssociationArgs| {
        State::new(
            AssociationModel::new(args.project_id, args.project_type, args.traffic_filter_id)
                .with_id(),
        )
    };

    match command {
        AssociationCommand::Create(args) => {
            let plan =
                AssociationModel::new(args.project_id, args.project_type, args.traffic_filter_id);
            let mut state = State::empty();
            let diags = resource.create(&plan, &mut state).await;
            Report::new(type_name, state, diags)
        }
        AssociationCommand::Read(args) => {
            let mut state = tracked(args);
            let diags = resource.read(&mut state).await;
            Report::new(type_name, state, diags)
        }
        AssociationCommand::Delete(args) => {
            let mut state = tracked(args);
            let diags = resource.delete(&mut state).await;
            Report::new(type_name, state, diags)
        }
        AssociationCommand::Import { key } => import_and_read(resource, &key).await,
    }
}

async fn import_and_read<R>(resource: &R, key: &str) -> Result<Report, DriverError>
where
    R: Resource,
    R::Model: Serialize,
{
    let mut state = State::empty();
    let mut diags = resource.import_state(key, &mut state);
    if !diags.has_error() {
        diags.append(resource.read(&mut state).await);
    }
    Report::new(resource.type_name(), state, diags)
}

#[derive(Serialize)]
struct ProjectFilters {
    project_id: String,
    project_type: ProjectKind,
    traffic_filters: Option<Vec<String>>,
}

async fn project_filters(
    client: Arc<dyn ServerlessApi>,
    project_id: &str,
    project_type: &str,
) -> Result<Report, DriverError> {
    let lookup = async {
        let kind: ProjectKind = project_type.parse()?;
        let filters = read_project_filters(client, kind, project_id).await?;
        Ok::<_, ResourceError>(ProjectFilters {
            project_id: project_id.to_string(),
            project_type: kind,
            traffic_filters: filters.map(|ids| ids.into_iter().collect()),
        })
    };

    match lookup.await {
        Ok(filters) => Report::new("project", State::new(filters), Diagnostics::new()),
        Err(e) => Report::new("project", State::<ProjectFilters>::empty(), e.into()),
    }
}
