pub mod config;
pub mod error;
pub mod estimator;
pub mod tables;
pub mod telemetry;
