//! Row structs for the `system_metrics` table.
//!
//! Each row struct is `FromRow` + `Serialize` and converts into the
//! matching `sysmon_core` domain type.

pub mod system_metric;
