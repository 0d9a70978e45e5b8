//! Applicant tracking workflows.
//!
//! The crate models the decision logic of a hiring pipeline: who may act on a job, how an
//! application moves through its stages, and how assessments are scheduled, attempted, and
//! graded. Persistence sits behind repository traits so the HTTP routers and services can run
//! against the bundled in-memory store or a database-backed adapter.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
