//! Domain types and pure logic for the host resource monitor.
//!
//! Nothing in this crate touches the database, the network or the host;
//! the sampler, store and dispatcher crates build on these types.

pub mod alert;
pub mod error;
pub mod sample;
pub mod threshold_validation;
pub mod thresholds;
pub mod types;
