//! Fundamental types and the activation/provisioning control plane.

pub mod activation;
pub mod assets;
pub mod config;
pub mod error;
pub mod host;
pub mod output;
pub mod stats_cli;
pub mod store;
pub mod sync;
pub mod telemetry;
pub mod time;
