//! Port traits between the decision core and its collaborators.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
pub mod execution_port;
pub mod report_port;
