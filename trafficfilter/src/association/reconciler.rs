//! Read-modify-write reconciliation of a single association.
//!
//! There is no server-side add or remove for one traffic filter: the project's
//! whole list is read, changed locally and written back. Two associations on
//! the same project reconciled at the same time can therefore overwrite each
//! other's change (last writer wins). The API offers no version token to
//! detect this up front, so the reconciler compares the membership the server
//! reports after a write with the one it wrote and warns on any difference.

use crate::association::membership::{MembershipSet, ProjectMembership};
use crate::diagnostics::Diagnostics;
use crate::errors::ResourceError;
use crate::metrics_defs::{MEMBERSHIP_CONCURRENT_MODIFICATION, MEMBERSHIP_NOOP, MEMBERSHIP_WRITE};
use shared::counter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Added,
    AlreadyPresent,
    Removed,
    AlreadyAbsent,
}

/// Membership with `filter_id` added, or `None` when it is already a member.
pub fn with_member(current: &MembershipSet, filter_id: &str) -> Option<MembershipSet> {
    if current.contains(filter_id) {
        return None;
    }

    let mut target = current.clone();
    target.insert(filter_id.to_string());
    Some(target)
}

/// Membership with `filter_id` removed, or `None` when it is not a member.
pub fn without_member(current: &MembershipSet, filter_id: &str) -> Option<MembershipSet> {
    if !current.contains(filter_id) {
        return None;
    }

    let mut target = current.clone();
    target.shift_remove(filter_id);
    Some(target)
}

fn describe(members: &MembershipSet) -> String {
    if members.is_empty() {
        return "(none)".to_string();
    }
    members
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct Reconciler<'a> {
    membership: &'a dyn ProjectMembership,
}

impl<'a> Reconciler<'a> {
    pub fn new(membership: &'a dyn ProjectMembership) -> Self {
        Reconciler { membership }
    }

    pub async fn is_present(
        &self,
        project_id: &str,
        filter_id: &str,
    ) -> Result<bool, ResourceError> {
        let current = self.membership.get_membership(project_id).await?;
        Ok(current.contains(filter_id))
    }

    pub async fn ensure_present(
        &self,
        project_id: &str,
        filter_id: &str,
        diags: &mut Diagnostics,
    ) -> Result<Transition, ResourceError> {
        let current = self.membership.get_membership(project_id).await?;

        match with_member(&current, filter_id) {
            Some(target) => {
                self.write(project_id, &current, &target, diags).await?;
                Ok(Transition::Added)
            }
            None => {
                self.record_noop(project_id, filter_id);
                Ok(Transition::AlreadyPresent)
            }
        }
    }

    pub async fn ensure_absent(
        &self,
        project_id: &str,
        filter_id: &str,
        diags: &mut Diagnostics,
    ) -> Result<Transition, ResourceError> {
        let current = self.membership.get_membership(project_id).await?;

        match without_member(&current, filter_id) {
            Some(target) => {
                self.write(project_id, &current, &target, diags).await?;
                Ok(Transition::Removed)
            }
            None => {
                self.record_noop(project_id, filter_id);
                Ok(Transition::AlreadyAbsent)
            }
        }
    }

    fn record_noop(&self, project_id: &str, filter_id: &str) {
        let kind = self.membership.kind();
        tracing::debug!(
            project_type = %kind,
            project_id = %project_id,
            traffic_filter_id = %filter_id,
            "Project traffic filters already in the desired state, skipping write"
        );
        counter!(MEMBERSHIP_NOOP, "project_type" => kind.as_str()).increment(1);
    }

    async fn write(
        &self,
        project_id: &str,
        current: &MembershipSet,
        target: &MembershipSet,
        diags: &mut Diagnostics,
    ) -> Result<(), ResourceError> {
        let kind = self.membership.kind();
        tracing::info!(
            project_type = %kind,
            project_id = %project_id,
            before = ?current,
            after = ?target,
            "Writing project traffic filters"
        );

        let reported = self.membership.patch_membership(project_id, target).await?;
        counter!(MEMBERSHIP_WRITE, "project_type" => kind.as_str()).increment(1);

        if &reported != target {
            tracing::warn!(
                project_type = %kind,
                project_id = %project_id,
                written = ?target,
                reported = ?reported,
                "Project traffic filters changed concurrently"
            );
            counter!(MEMBERSHIP_CONCURRENT_MODIFICATION, "project_type" => kind.as_str())
                .increment(1);
            diags.add_warning(
                "Concurrent traffic filter modification",
                format!(
                    "The {} project {} reported traffic filters [{}] after [{}] was written. \
                     Another writer changed the project's traffic filters between the read and \
                     the write; the last write wins, so a concurrent change may have been lost.",
                    kind.display_name(),
                    project_id,
                    describe(&reported),
                    describe(target),
                ),
            );
        }

        Ok(())
    }
}
