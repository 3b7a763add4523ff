//! Threshold alert types.

use serde::Serialize;

use crate::types::Timestamp;

/// Prefix of every alert subject line.
pub const SUBJECT_PREFIX: &str = "System Alert: ";

/// One kind of threshold breach.
///
/// The declaration order is the order sections appear in a composite alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HighCpu,
    HighRam,
    LowBattery,
}

impl AlertKind {
    /// Short tag used in the alert subject line.
    pub fn tag(self) -> &'static str {
        match self {
            Self::HighCpu => "High CPU",
            Self::HighRam => "High RAM",
            Self::LowBattery => "Low Battery",
        }
    }
}

/// A composite notification covering every breach found in one sample.
///
/// Built transiently by [`crate::thresholds::evaluate`] and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    /// Breaches included in this alert, in section order.
    pub kinds: Vec<AlertKind>,
    pub subject: String,
    pub body: String,
    /// Timestamp of the stored sample the alert was built from.
    pub triggered_at: Timestamp,
}
