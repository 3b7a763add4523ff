//! `sysmon-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod battery;
pub mod collector;
pub mod config;
pub mod runner;
