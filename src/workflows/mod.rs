//! Job submissions and the checks they go through before being stored.
//!
//! * `graph`: a generic directed graph, with cycle detection,
//! * `request`: the job submission format and its validation,
//! * `error`: every error a submission can end up with.

mod error;
mod graph;
mod request;

pub use crate::workflows::error::JobError;
pub use crate::workflows::graph::{render_path, DependencyGraph, GraphError};
pub use crate::workflows::request::{JobRequest, TaskRequest};
