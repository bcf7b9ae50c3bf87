//! Core infrastructure for helios

pub mod config;
pub mod logging;

pub use config::Config;
