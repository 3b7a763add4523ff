//! Alert delivery for the host resource monitor.
//!
//! - [`AlertDispatcher`]: the best-effort boundary the collection cycle
//!   calls; channel failures are logged and reported as a
//!   [`DispatchOutcome`], never returned as errors.
//! - [`AlertChannel`]: the seam a delivery channel implements.
//! - [`delivery`]: concrete channels (SMTP email).

pub mod delivery;
pub mod dispatcher;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, Recipients};
pub use dispatcher::{AlertChannel, AlertDispatcher, DispatchError, DispatchOutcome};
