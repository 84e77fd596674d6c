//! Concrete adapter implementations for ports.

pub mod chart_recorder;
pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod file_config_adapter;
