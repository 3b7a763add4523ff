//! Host resource sample types.
//!
//! A [`Sample`] is one snapshot of CPU, memory and (optional) battery state
//! as read by the sampler. Once persisted it comes back from the store as a
//! [`StoredSample`], which adds the row id and the store-assigned timestamp.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Stored value for a battery whose remaining time cannot be estimated.
pub const TIME_LEFT_UNKNOWN: i64 = -1;

/// Stored value for a battery that is charging / on AC power with no
/// discharge in sight.
pub const TIME_LEFT_UNLIMITED: i64 = -2;

/// Estimated time until the battery is empty (or full, while charging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryTimeLeft {
    Seconds(u64),
    Unknown,
    Unlimited,
}

impl BatteryTimeLeft {
    /// Encode as the integer stored in `system_metrics.battery_time_left`.
    pub fn to_db(self) -> i64 {
        match self {
            Self::Seconds(secs) => i64::try_from(secs).unwrap_or(i64::MAX),
            Self::Unknown => TIME_LEFT_UNKNOWN,
            Self::Unlimited => TIME_LEFT_UNLIMITED,
        }
    }

    /// Decode a stored integer. Any negative value other than the
    /// unlimited sentinel is treated as unknown.
    pub fn from_db(value: i64) -> Self {
        match value {
            TIME_LEFT_UNLIMITED => Self::Unlimited,
            v if v < 0 => Self::Unknown,
            v => Self::Seconds(v as u64),
        }
    }
}

/// Battery state at sampling time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReading {
    /// Charge level, 0-100.
    pub percent: f64,
    /// `true` while a charger is connected (charging or full).
    pub charger_plugged: bool,
    pub time_left: BatteryTimeLeft,
}

/// One snapshot of host resource metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// CPU utilisation averaged over the sampling interval, 0-100.
    pub cpu_percent: f64,
    /// Cumulative seconds spent in user mode since boot.
    pub cpu_time_user: f64,
    /// Cumulative seconds spent in kernel mode since boot.
    pub cpu_time_system: f64,
    /// Cumulative idle seconds since boot.
    pub cpu_time_idle: f64,
    /// Physical memory in bytes, excluding swap.
    pub mem_total: u64,
    /// Memory that can be handed to processes without swapping, in bytes.
    pub mem_avail: u64,
    /// Memory in use as reported by the platform. Not necessarily
    /// `mem_total - mem_avail`.
    pub mem_used: u64,
    /// `(mem_total - mem_avail) / mem_total * 100`.
    pub mem_percent: f64,
    /// `None` on hosts without a battery.
    pub battery: Option<BatteryReading>,
}

impl Sample {
    /// Battery charge level, if the host has a battery.
    pub fn battery_percent(&self) -> Option<f64> {
        self.battery.as_ref().map(|b| b.percent)
    }
}

/// Compute the memory-in-use percentage from total and available bytes.
///
/// Returns `0.0` when `total` is zero.
pub fn memory_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let in_use = total.saturating_sub(available);
    in_use as f64 / total as f64 * 100.0
}

/// A sample as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSample {
    pub id: DbId,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub sample: Sample,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_left_sentinels_decode() {
        assert_eq!(BatteryTimeLeft::from_db(-1), BatteryTimeLeft::Unknown);
        assert_eq!(BatteryTimeLeft::from_db(-2), BatteryTimeLeft::Unlimited);
        assert_eq!(BatteryTimeLeft::from_db(-7), BatteryTimeLeft::Unknown);
        assert_eq!(BatteryTimeLeft::from_db(0), BatteryTimeLeft::Seconds(0));
        assert_eq!(
            BatteryTimeLeft::from_db(5400),
            BatteryTimeLeft::Seconds(5400)
        );
    }

    #[test]
    fn time_left_encodes_sentinels() {
        assert_eq!(BatteryTimeLeft::Unknown.to_db(), TIME_LEFT_UNKNOWN);
        assert_eq!(BatteryTimeLeft::Unlimited.to_db(), TIME_LEFT_UNLIMITED);
        assert_eq!(BatteryTimeLeft::Seconds(90).to_db(), 90);
    }

    #[test]
    fn memory_percent_uses_available_not_used() {
        // 16 GiB total, 4 GiB available -> 75% in use.
        let total = 16 * 1024 * 1024 * 1024;
        let avail = 4 * 1024 * 1024 * 1024;
        assert!((memory_percent(total, avail) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn memory_percent_zero_total() {
        assert_eq!(memory_percent(0, 0), 0.0);
    }

    #[test]
    fn battery_percent_absent_without_battery() {
        let sample = Sample {
            cpu_percent: 10.0,
            cpu_time_user: 1.0,
            cpu_time_system: 1.0,
            cpu_time_idle: 1.0,
            mem_total: 100,
            mem_avail: 50,
            mem_used: 50,
            mem_percent: 50.0,
            battery: None,
        };
        assert_eq!(sample.battery_percent(), None);
    }
}
