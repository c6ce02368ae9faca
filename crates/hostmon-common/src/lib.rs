//! Shared data model for the hostmon agent: samples, routing categories,
//! log levels and the deployment mode label.

pub mod types;
