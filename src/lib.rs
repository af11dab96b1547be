pub mod config;
pub mod error;
pub mod maturity;
pub mod telemetry;
