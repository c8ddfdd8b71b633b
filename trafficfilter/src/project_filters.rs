//! Traffic filters declared inline on a project.
//!
//! A project may carry its own `traffic_filters` attribute instead of
//! separate association resources. The two must not be combined: both
//! rewrite the same list.

use crate::association::membership::{MembershipSet, membership_for};
use crate::errors::ResourceError;
use crate::project_kind::ProjectKind;
use serverless_api::ServerlessApi;
use serverless_api::types::{TrafficFilter, TrafficFilters};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Filter list for an API request. An absent or empty set leaves the field
/// out of the request.
pub fn traffic_filters_from_model(filters: Option<&BTreeSet<String>>) -> Option<TrafficFilters> {
    filters
        .filter(|ids| !ids.is_empty())
        .map(|ids| ids.iter().map(TrafficFilter::new).collect())
}

/// Inline set for a project record. A missing or empty list becomes `None`.
pub fn traffic_filters_to_model(filters: Option<&[TrafficFilter]>) -> Option<BTreeSet<String>> {
    filters
        .filter(|list| !list.is_empty())
        .map(|list| list.iter().map(|filter| filter.id.clone()).collect())
}

fn membership_to_model(members: MembershipSet) -> Option<BTreeSet<String>> {
    let filters: TrafficFilters = members.into_iter().map(TrafficFilter::new).collect();
    traffic_filters_to_model(Some(filters.as_slice()))
}

/// Current inline filter set of a project.
pub async fn read_project_filters(
    client: Arc<dyn ServerlessApi>,
    kind: ProjectKind,
    project_id: &str,
) -> Result<Option<BTreeSet<String>>, ResourceError> {
    let members = membership_for(kind, client).get_membership(project_id).await?;
    Ok(membership_to_model(members))
}

/// Replaces the project's filter list with `filters`. `None` leaves the
/// project untouched.
pub async fn write_project_filters(
    client: Arc<dyn ServerlessApi>,
    kind: ProjectKind,
    project_id: &str,
    filters: Option<&BTreeSet<String>>,
) -> Result<Option<BTreeSet<String>>, ResourceError> {
    let Some(filters) = traffic_filters_from_model(filters) else {
        return read_project_filters(client, kind, project_id).await;
    };

    let members: MembershipSet = filters.into_iter().map(|filter| filter.id).collect();
    tracing::info!(
        project_type = %kind,
        project_id = %project_id,
        traffic_filters = ?members,
        "Writing inline project traffic filters"
    );
    let echoed = membership_for(kind, client)
        .patch_membership(project_id, &members)
        .await?;
    Ok(membership_to_model(echoed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::FakeServerless;

    fn ids(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_from_model() {
        assert_eq!(traffic_filters_from_model(None), None);
        assert_eq!(traffic_filters_from_model(Some(&BTreeSet::new())), None);
        assert_eq!(
            traffic_filters_from_model(Some(&ids(&["b", "a"]))),
            Some(vec![TrafficFilter::new("a"), TrafficFilter::new("b")])
        );
    }

    #[test]
    fn test_to_model() {
        assert_eq!(traffic_filters_to_model(None), None);
        assert_eq!(traffic_filters_to_model(Some(&[][..])), None);

        let list = [TrafficFilter::new("x"), TrafficFilter::new("y"), TrafficFilter::new("x")];
        assert_eq!(traffic_filters_to_model(Some(&list[..])), Some(ids(&["x", "y"])));
    }

    #[tokio::test]
    async fn test_read_project_filters() {
        let fake = Arc::new(
            FakeServerless::new()
                .with_project(ProjectKind::Security, "p1", &["b", "a"])
                .with_project_without_filters(ProjectKind::Elasticsearch, "p2"),
        );

        let filters = read_project_filters(fake.clone(), ProjectKind::Security, "p1")
            .await
            .unwrap();
        assert_eq!(filters, Some(ids(&["a", "b"])));

        let filters = read_project_filters(fake.clone(), ProjectKind::Elasticsearch, "p2")
            .await
            .unwrap();
        assert_eq!(filters, None);

        let err = read_project_filters(fake, ProjectKind::Observability, "p1")
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::ProjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_write_project_filters() {
        let fake = Arc::new(
            FakeServerless::new().with_project(ProjectKind::Observability, "p1", &["a"]),
        );

        let echoed = write_project_filters(
            fake.clone(),
            ProjectKind::Observability,
            "p1",
            Some(&ids(&["c", "b"])),
        )
        .await
        .unwrap();

        assert_eq!(echoed, Some(ids(&["b", "c"])));
        assert_eq!(
            fake.project_filters(ProjectKind::Observability, "p1"),
            Some(vec!["b".to_string(), "c".to_string()])
        );
    }

    #[tokio::test]
    async fn test_write_without_filters_leaves_project_alone() {
        let fake = Arc::new(
            FakeServerless::new().with_project(ProjectKind::Observability, "p1", &["a"]),
        );

        let current = write_project_filters(fake.clone(), ProjectKind::Observability, "p1", None)
            .await
            .unwrap();

        assert_eq!(current, Some(ids(&["a"])));
        assert_eq!(fake.patch_count(), 0);
    }
}
