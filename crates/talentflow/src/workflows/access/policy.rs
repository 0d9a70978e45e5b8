use std::collections::BTreeSet;

use super::identity::{OrganizationId, RequestContext, Role, UserId};
use crate::workflows::WorkflowError;

/// Ownership and assignment fields of a guarded resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceScope<'a> {
    pub owner_id: UserId,
    pub organization_id: OrganizationId,
    pub assigned_ids: &'a BTreeSet<UserId>,
}

impl<'a> ResourceScope<'a> {
    pub fn new(
        owner_id: UserId,
        organization_id: OrganizationId,
        assigned_ids: &'a BTreeSet<UserId>,
    ) -> Self {
        Self {
            owner_id,
            organization_id,
            assigned_ids,
        }
    }

    /// Same resource with delegated access ignored, leaving owner and OrgAdmin.
    pub fn owner_only(self) -> ResourceScope<'static> {
        ResourceScope::owned_by(self.owner_id, self.organization_id)
    }
}

impl ResourceScope<'static> {
    /// Resource with no delegated users.
    pub fn owned_by(owner_id: UserId, organization_id: OrganizationId) -> Self {
        static NOBODY: BTreeSet<UserId> = BTreeSet::new();
        ResourceScope {
            owner_id,
            organization_id,
            assigned_ids: &NOBODY,
        }
    }
}

/// Decide whether the requester may act on the resource.
///
/// A missing requester or a cross-organization request is always denied. Within the
/// organization the owner, any OrgAdmin, and explicitly assigned users are allowed.
pub fn is_authorized(requester: Option<&RequestContext>, resource: &ResourceScope<'_>) -> bool {
    let Some(requester) = requester else {
        return false;
    };

    if requester.organization_id != resource.organization_id {
        return false;
    }

    requester.user_id == resource.owner_id
        || requester.role == Role::OrgAdmin
        || resource.assigned_ids.contains(&requester.user_id)
}

pub fn authorize(
    requester: &RequestContext,
    resource: &ResourceScope<'_>,
) -> Result<(), WorkflowError> {
    if is_authorized(Some(requester), resource) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = requester.user_id.0,
            organization_id = requester.organization_id.0,
            role = %requester.role,
            "authorization denied"
        );
        Err(WorkflowError::Unauthorized)
    }
}
