mod batches;
mod common;
mod jobs;
mod nodes;
mod tasks;

pub use crate::models::batches::Batch;
pub use crate::models::common::ModelError;
pub use crate::models::jobs::{Job, JobId, JobKind, NewJob};
pub use crate::models::nodes::{NewNode, Node, NodeId};
pub use crate::models::tasks::{NewTask, Task, TaskId};
