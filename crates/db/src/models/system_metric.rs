//! Host sample rows (append-only).

use serde::Serialize;
use sqlx::FromRow;
use sysmon_core::sample::{BatteryReading, BatteryTimeLeft, Sample, StoredSample};
use sysmon_core::types::{DbId, Timestamp};

/// A single row of `system_metrics`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemMetric {
    pub id: DbId,
    pub timestamp: Timestamp,
    pub cpu_percent: f64,
    pub cpu_time_user: f64,
    pub cpu_time_system: f64,
    pub cpu_time_idle: f64,
    pub mem_total: i64,
    pub mem_avail: i64,
    pub mem_used: i64,
    pub mem_percent: f64,
    pub battery_percent: Option<f64>,
    /// Stored as 0/1; NULL when the host has no battery.
    pub charger_plugged: Option<i64>,
    /// Seconds, or a negative sentinel (see [`BatteryTimeLeft::from_db`]).
    pub battery_time_left: Option<i64>,
}

impl From<SystemMetric> for StoredSample {
    fn from(row: SystemMetric) -> Self {
        let battery = row.battery_percent.map(|percent| BatteryReading {
            percent,
            charger_plugged: row.charger_plugged.is_some_and(|v| v != 0),
            time_left: row
                .battery_time_left
                .map_or(BatteryTimeLeft::Unknown, BatteryTimeLeft::from_db),
        });

        StoredSample {
            id: row.id,
            timestamp: row.timestamp,
            sample: Sample {
                cpu_percent: row.cpu_percent,
                cpu_time_user: row.cpu_time_user,
                cpu_time_system: row.cpu_time_system,
                cpu_time_idle: row.cpu_time_idle,
                mem_total: u64::try_from(row.mem_total).unwrap_or_default(),
                mem_avail: u64::try_from(row.mem_avail).unwrap_or_default(),
                mem_used: u64::try_from(row.mem_used).unwrap_or_default(),
                mem_percent: row.mem_percent,
                battery,
            },
        }
    }
}

/// Cumulative CPU time split of the latest sample, in seconds.
///
/// All zeros when the store is empty.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize)]
pub struct CpuTimeDistribution {
    pub system: f64,
    pub user: f64,
    pub idle: f64,
}
