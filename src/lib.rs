pub mod alerting;
pub mod config;
pub mod logging;
pub mod market;
pub mod monitor;
pub mod scenario;
pub mod scheduling;
pub mod types;
