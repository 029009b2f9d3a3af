//! Port traits for the external collaborators: market data, config and reports.

pub mod config_port;
pub mod data_port;
pub mod report_port;
