use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::identity::{RequestContext, Role, UserId};

/// Directory entry for a user who can be granted access to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recruiter {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Recruiters of an organization split by their relationship to one job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterPartition {
    pub locked: Vec<Recruiter>,
    pub additional: Vec<Recruiter>,
    pub available: Vec<Recruiter>,
}

/// Split `all` into locked, additionally assigned, and still available recruiters.
///
/// Each recruiter lands in exactly one bucket and keeps its relative order from `all`.
pub fn partition_recruiters(
    all: &[Recruiter],
    assigned_ids: &BTreeSet<UserId>,
    locked_ids: &BTreeSet<UserId>,
) -> RecruiterPartition {
    let mut partition = RecruiterPartition::default();

    for recruiter in all {
        if locked_ids.contains(&recruiter.id) {
            partition.locked.push(recruiter.clone());
        } else if assigned_ids.contains(&recruiter.id) {
            partition.additional.push(recruiter.clone());
        } else {
            partition.available.push(recruiter.clone());
        }
    }

    partition
}

/// Recruiters whose access the given actor cannot revoke on a job owned by `owner`.
pub fn locked_recruiters(owner: UserId, actor: &RequestContext) -> BTreeSet<UserId> {
    let mut locked = BTreeSet::from([owner]);
    if actor.role == Role::OrgAdmin && actor.user_id != owner {
        locked.insert(actor.user_id);
    }
    locked
}

/// One edit against a job's recruiter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RecruiterEdit {
    Add { recruiter_id: UserId },
    Remove { recruiter_id: UserId },
    /// Replace the whole selection; locked recruiters are kept regardless.
    Replace { recruiter_ids: Vec<UserId> },
}

impl RecruiterEdit {
    pub(crate) fn referenced_ids(&self) -> Vec<UserId> {
        match self {
            RecruiterEdit::Add { recruiter_id } | RecruiterEdit::Remove { recruiter_id } => {
                vec![*recruiter_id]
            }
            RecruiterEdit::Replace { recruiter_ids } => recruiter_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("recruiter {0} is locked on this job and cannot be removed")]
    LockedRecruiter(i64),
}

/// Assigned recruiters of a job with the locked subset pinned in place.
///
/// Locked ids are always members of the assigned set; no edit can take them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruiterAccessSet {
    assigned: BTreeSet<UserId>,
    locked: BTreeSet<UserId>,
}

impl RecruiterAccessSet {
    pub fn new(assigned: BTreeSet<UserId>, locked: BTreeSet<UserId>) -> Self {
        let assigned = assigned.union(&locked).copied().collect();
        Self { assigned, locked }
    }

    /// Returns `true` when the recruiter was not already assigned.
    pub fn add(&mut self, id: UserId) -> bool {
        self.assigned.insert(id)
    }

    /// Returns `true` when the recruiter was assigned and is now removed.
    pub fn remove(&mut self, id: UserId) -> Result<bool, AccessError> {
        if self.locked.contains(&id) {
            return Err(AccessError::LockedRecruiter(id.0));
        }
        Ok(self.assigned.remove(&id))
    }

    pub fn replace(&mut self, ids: impl IntoIterator<Item = UserId>) {
        let mut assigned: BTreeSet<UserId> = ids.into_iter().collect();
        assigned.extend(self.locked.iter().copied());
        self.assigned = assigned;
    }

    /// Apply edits in order. Nothing changes when any edit is rejected.
    pub fn apply(&mut self, edits: &[RecruiterEdit]) -> Result<(), AccessError> {
        let mut staged = self.clone();
        for edit in edits {
            match edit {
                RecruiterEdit::Add { recruiter_id } => {
                    staged.add(*recruiter_id);
                }
                RecruiterEdit::Remove { recruiter_id } => {
                    staged.remove(*recruiter_id)?;
                }
                RecruiterEdit::Replace { recruiter_ids } => {
                    staged.replace(recruiter_ids.iter().copied());
                }
            }
        }
        *self = staged;
        Ok(())
    }

    pub fn assigned(&self) -> &BTreeSet<UserId> {
        &self.assigned
    }

    pub fn locked(&self) -> &BTreeSet<UserId> {
        &self.locked
    }

    pub fn into_assigned(self) -> BTreeSet<UserId> {
        self.assigned
    }
}
