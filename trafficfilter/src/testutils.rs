//! In-memory `ServerlessApi` for exercising the resources without a server.

use crate::project_kind::ProjectKind;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serverless_api::types::{
    CreateTrafficFilterRequest, ElasticsearchProject, ObservabilityProject,
    PatchElasticsearchProjectRequest, PatchObservabilityProjectRequest,
    PatchSecurityProjectRequest, PatchTrafficFilterRequest, SecurityProject, TrafficFilterInfo,
    TrafficFilters,
};
use serverless_api::{ApiError, ApiResponse, ServerlessApi};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    projects: HashMap<(ProjectKind, String), Option<Vec<String>>>,
    filters: BTreeMap<String, TrafficFilterInfo>,
    next_filter_id: u32,
    next_response: Option<(StatusCode, String)>,
    next_patch_failure: Option<(StatusCode, String)>,
    transport_failure: bool,
    concurrent_member: Option<String>,
    calls: Vec<String>,
    patch_count: usize,
    last_request: Option<serde_json::Value>,
}

#[derive(Default)]
pub struct FakeServerless {
    inner: Mutex<Inner>,
}

impl FakeServerless {
    pub fn new() -> Self {
        FakeServerless::default()
    }

    pub fn with_project(self, kind: ProjectKind, id: &str, filters: &[&str]) -> Self {
        let filters = filters.iter().map(|f| f.to_string()).collect();
        self.lock()
            .projects
            .insert((kind, id.to_string()), Some(filters));
        self
    }

    /// A project whose record has no `traffic_filters` field at all.
    pub fn with_project_without_filters(self, kind: ProjectKind, id: &str) -> Self {
        self.lock().projects.insert((kind, id.to_string()), None);
        self
    }

    pub fn with_filter(self, info: TrafficFilterInfo) -> Self {
        self.lock().filters.insert(info.id.clone(), info);
        self
    }

    /// Answers the next call, whatever it is, with `status` and `body`.
    pub fn with_next_response(self, status: StatusCode, body: &str) -> Self {
        self.lock().next_response = Some((status, body.to_string()));
        self
    }

    /// Every call fails before reaching the server.
    pub fn with_transport_failure(self) -> Self {
        self.lock().transport_failure = true;
        self
    }

    /// Simulates another writer appending `id` to a project right after
    /// each patch lands.
    pub fn with_concurrent_member(self, id: &str) -> Self {
        self.lock().concurrent_member = Some(id.to_string());
        self
    }

    pub fn fail_next_patch(&self, status: StatusCode, body: &str) {
        self.lock().next_patch_failure = Some((status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn patch_count(&self) -> usize {
        self.lock().patch_count
    }

    pub fn project_filters(&self, kind: ProjectKind, id: &str) -> Option<Vec<String>> {
        self.lock()
            .projects
            .get(&(kind, id.to_string()))
            .cloned()
            .flatten()
    }

    pub fn filter(&self, id: &str) -> Option<TrafficFilterInfo> {
        self.lock().filters.get(id).cloned()
    }

    /// JSON body of the last create or patch request sent to a filter.
    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.lock().last_request.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Records the call and applies the configured failure, if any.
    fn begin<T>(&self, call: String) -> Result<Option<ApiResponse<T>>, ApiError> {
        let mut inner = self.lock();
        inner.calls.push(call);

        if inner.transport_failure {
            return Err(ApiError::InvalidUrl("connection refused".to_string()));
        }

        Ok(inner
            .next_response
            .take()
            .map(|(status, body)| ApiResponse::new(status, None, Bytes::from(body))))
    }

    fn project_response<P: DeserializeOwned>(&self, kind: ProjectKind, id: &str) -> ApiResponse<P> {
        let inner = self.lock();
        let Some(filters) = inner.projects.get(&(kind, id.to_string())) else {
            return not_found();
        };

        let mut project = serde_json::json!({"id": id, "name": format!("{kind}-{id}")});
        if let Some(filters) = filters {
            let refs: Vec<_> = filters.iter().map(|f| serde_json::json!({"id": f})).collect();
            project["traffic_filters"] = serde_json::Value::Array(refs);
        }

        ok(StatusCode::OK, serde_json::from_value(project.clone()).unwrap(), &project)
    }

    async fn get_project<P: DeserializeOwned>(
        &self,
        kind: ProjectKind,
        id: &str,
    ) -> Result<ApiResponse<P>, ApiError> {
        if let Some(response) = self.begin(format!("get_{kind}_project:{id}"))? {
            return Ok(response);
        }
        Ok(self.project_response(kind, id))
    }

    async fn patch_project<P: DeserializeOwned>(
        &self,
        kind: ProjectKind,
        id: &str,
        traffic_filters: Option<&TrafficFilters>,
    ) -> Result<ApiResponse<P>, ApiError> {
        if let Some(response) = self.begin(format!("patch_{kind}_project:{id}"))? {
            return Ok(response);
        }

        {
            let mut inner = self.lock();
            if let Some((status, body)) = inner.next_patch_failure.take() {
                return Ok(ApiResponse::new(status, None, Bytes::from(body)));
            }

            let concurrent = inner.concurrent_member.clone();
            let Some(stored) = inner.projects.get_mut(&(kind, id.to_string())) else {
                return Ok(not_found());
            };

            if let Some(filters) = traffic_filters {
                let mut ids: Vec<String> = filters.iter().map(|f| f.id.clone()).collect();
                ids.extend(concurrent);
                *stored = Some(ids);
            }
            inner.patch_count += 1;
        }

        Ok(self.project_response(kind, id))
    }
}

fn ok<T, B: Serialize>(status: StatusCode, payload: T, body: &B) -> ApiResponse<T> {
    let body = serde_json::to_vec(body).unwrap();
    ApiResponse::new(status, Some(payload), Bytes::from(body))
}

fn not_found<T>() -> ApiResponse<T> {
    ApiResponse::new(
        StatusCode::NOT_FOUND,
        None,
        Bytes::from_static(br#"{"errors":[{"code":"not_found"}]}"#),
    )
}

#[async_trait]
impl ServerlessApi for FakeServerless {
    async fn get_elasticsearch_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<ElasticsearchProject>, ApiError> {
        self.get_project(ProjectKind::Elasticsearch, id).await
    }

    async fn patch_elasticsearch_project(
        &self,
        id: &str,
        request: &PatchElasticsearchProjectRequest,
    ) -> Result<ApiResponse<ElasticsearchProject>, ApiError> {
        self.patch_project(ProjectKind::Elasticsearch, id, request.traffic_filters.as_ref())
            .await
    }

    async fn get_observability_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<ObservabilityProject>, ApiError> {
        self.get_project(ProjectKind::Observability, id).await
    }

    async fn patch_observability_project(
        &self,
        id: &str,
        request: &PatchObservabilityProjectRequest,
    ) -> Result<ApiResponse<ObservabilityProject>, ApiError> {
        self.patch_project(ProjectKind::Observability, id, request.traffic_filters.as_ref())
            .await
    }

    async fn get_security_project(
        &self,
        id: &str,
    ) -> Result<ApiResponse<SecurityProject>, ApiError> {
        self.get_project(ProjectKind::Security, id).await
    }

    async fn patch_security_project(
        &self,
        id: &str,
        request: &PatchSecurityProjectRequest,
    ) -> Result<ApiResponse<SecurityProject>, ApiError> {
        self.patch_project(ProjectKind::Security, id, request.traffic_filters.as_ref())
            .await
    }

    async fn create_traffic_filter(
        &self,
        request: &CreateTrafficFilterRequest,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError> {
        if let Some(response) = self.begin("create_traffic_filter".to_string())? {
            return Ok(response);
        }

        let mut inner = self.lock();
        inner.last_request = Some(serde_json::to_value(request).unwrap());
        inner.next_filter_id += 1;

        let info = TrafficFilterInfo {
            id: format!("tf-{}", inner.next_filter_id),
            name: request.name.clone(),
            filter_type: request.filter_type,
            region: request.region.clone(),
            include_by_default: request.include_by_default.unwrap_or_default(),
            description: request.description.clone(),
            rules: request.rules.clone().unwrap_or_default(),
        };
        inner.filters.insert(info.id.clone(), info.clone());

        Ok(ok(StatusCode::CREATED, info.clone(), &info))
    }

    async fn get_traffic_filter(
        &self,
        id: &str,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError> {
        if let Some(response) = self.begin(format!("get_traffic_filter:{id}"))? {
            return Ok(response);
        }

        match self.lock().filters.get(id) {
            Some(info) => Ok(ok(StatusCode::OK, info.clone(), info)),
            None => Ok(not_found()),
        }
    }

    async fn patch_traffic_filter(
        &self,
        id: &str,
        request: &PatchTrafficFilterRequest,
    ) -> Result<ApiResponse<TrafficFilterInfo>, ApiError> {
        if let Some(response) = self.begin(format!("patch_traffic_filter:{id}"))? {
            return Ok(response);
        }

        let mut inner = self.lock();
        inner.last_request = Some(serde_json::to_value(request).unwrap());

        let Some(info) = inner.filters.get_mut(id) else {
            return Ok(not_found());
        };
        if let Some(name) = &request.name {
            info.name = name.clone();
        }
        if let Some(description) = &request.description {
            info.description = Some(description.clone());
        }
        if let Some(include_by_default) = request.include_by_default {
            info.include_by_default = include_by_default;
        }
        if let Some(rules) = &request.rules {
            info.rules = rules.clone();
        }

        let info = info.clone();
        Ok(ok(StatusCode::OK, info.clone(), &info))
    }

    async fn delete_traffic_filter(&self, id: &str) -> Result<ApiResponse<()>, ApiError> {
        if let Some(response) = self.begin(format!("delete_traffic_filter:{id}"))? {
            return Ok(response);
        }

        match self.lock().filters.remove(id) {
            Some(_) => Ok(ApiResponse::new(StatusCode::OK, None, Bytes::new())),
            None => Ok(not_found()),
        }
    }
}
