//! Host metrics sampling.
//!
//! [`SystemSampler`] reads CPU utilisation and memory through `sysinfo`,
//! cumulative CPU times from `/proc/stat` (Linux), and battery state from
//! sysfs. CPU utilisation is averaged over [`CPU_AVERAGING_INTERVAL`], so a
//! call to [`MetricSampler::sample`] takes about a second.
//!
//! Battery is optional hardware: a missing or unreadable battery leaves
//! `Sample::battery` as `None` instead of failing the sample.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::System;
use sysmon_core::sample::{memory_percent, Sample};

use crate::battery;

/// Window over which CPU utilisation is averaged.
pub const CPU_AVERAGING_INTERVAL: Duration = Duration::from_secs(1);

/// Error raised when the host cannot be sampled.
#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    #[error("Failed to read CPU times: {0}")]
    CpuTimes(String),

    /// The platform reported zero physical memory.
    #[error("Memory statistics unavailable")]
    MemoryUnavailable,

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

/// Produces one [`Sample`] per call.
#[async_trait]
pub trait MetricSampler: Send {
    async fn sample(&mut self) -> Result<Sample, SamplingError>;
}

/// Cumulative CPU-state time since boot, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CpuTimes {
    user: f64,
    system: f64,
    idle: f64,
}

/// Samples the local host.
pub struct SystemSampler {
    system: System,
    power_supply_path: PathBuf,
}

impl SystemSampler {
    /// Create a sampler reading battery state under `power_supply_path`.
    pub fn new(power_supply_path: impl Into<PathBuf>) -> Self {
        Self {
            system: System::new(),
            power_supply_path: power_supply_path.into(),
        }
    }
}

#[async_trait]
impl MetricSampler for SystemSampler {
    async fn sample(&mut self) -> Result<Sample, SamplingError> {
        // Two refreshes bracketing the interval give an averaged reading.
        self.system.refresh_cpu_usage();
        tokio::time::sleep(CPU_AVERAGING_INTERVAL.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
        self.system.refresh_cpu_usage();
        let cpu_percent = f64::from(self.system.global_cpu_usage()).clamp(0.0, 100.0);

        let cpu_times = read_cpu_times()?;

        self.system.refresh_memory();
        let mem_total = self.system.total_memory();
        if mem_total == 0 {
            return Err(SamplingError::MemoryUnavailable);
        }
        let mem_avail = self.system.available_memory();
        let mem_used = self.system.used_memory();

        let battery = battery::read_battery(&self.power_supply_path);

        let sample = Sample {
            cpu_percent,
            cpu_time_user: cpu_times.user,
            cpu_time_system: cpu_times.system,
            cpu_time_idle: cpu_times.idle,
            mem_total,
            mem_avail,
            mem_used,
            mem_percent: memory_percent(mem_total, mem_avail),
            battery,
        };

        tracing::debug!(
            cpu_percent = sample.cpu_percent,
            mem_percent = sample.mem_percent,
            battery_percent = ?sample.battery_percent(),
            "Host sampled"
        );
        Ok(sample)
    }
}

#[cfg(target_os = "linux")]
fn read_cpu_times() -> Result<CpuTimes, SamplingError> {
    use procfs::{CurrentSI, KernelStats};

    let stats = KernelStats::current().map_err(|e| SamplingError::CpuTimes(e.to_string()))?;
    let total = stats.total;
    Ok(CpuTimes {
        user: ms_to_secs(total.user_ms()),
        system: ms_to_secs(total.system_ms()),
        idle: ms_to_secs(total.idle_ms()),
    })
}

#[cfg(not(target_os = "linux"))]
fn read_cpu_times() -> Result<CpuTimes, SamplingError> {
    Err(SamplingError::Unsupported("cumulative CPU times"))
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
