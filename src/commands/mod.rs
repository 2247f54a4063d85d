mod check_job;
mod create_node;
mod run_server;

pub use crate::commands::check_job::check_job;
pub use crate::commands::create_node::create_node;
pub use crate::commands::run_server::run_server;
