//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&DbPool` as the first argument.

pub mod system_metric_repo;

pub use system_metric_repo::SystemMetricRepo;
