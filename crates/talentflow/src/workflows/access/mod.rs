//! Requester identity, the resource authorization predicate, and recruiter assignment sets.

mod extract;
pub mod identity;
pub mod policy;
pub mod recruiters;

pub use extract::{ORGANIZATION_ID_HEADER, ROLE_HEADER, USER_ID_HEADER};
pub use identity::{OrganizationId, RequestContext, Role, UnknownRole, UserId};
pub use policy::{authorize, is_authorized, ResourceScope};
pub use recruiters::{
    locked_recruiters, partition_recruiters, AccessError, Recruiter, RecruiterAccessSet,
    RecruiterEdit, RecruiterPartition,
};
