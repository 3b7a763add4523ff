//! Battery state from the sysfs power-supply class.
//!
//! Reads `/sys/class/power_supply/*` (root overridable for tests and
//! containers). Every entry whose `type` is `Battery` is a candidate; the
//! first one by name that reports a charge level wins. Mains / USB entries
//! with `online` = 1 mark the charger as plugged.
//!
//! A host without a battery, or with an unreadable one, yields `None`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sysmon_core::sample::{BatteryReading, BatteryTimeLeft};

/// Default location of the power-supply class directory.
pub const DEFAULT_POWER_SUPPLY_PATH: &str = "/sys/class/power_supply";

const SECS_PER_HOUR: f64 = 3600.0;

/// Read the current battery state under `root`.
pub fn read_battery(root: &Path) -> Option<BatteryReading> {
    match read_battery_inner(root) {
        Ok(Some(reading)) => Some(reading),
        Ok(None) => {
            tracing::debug!(root = %root.display(), "No battery found");
            None
        }
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "Battery state unreadable, treating as absent");
            None
        }
    }
}

fn read_battery_inner(root: &Path) -> io::Result<Option<BatteryReading>> {
    if !root.is_dir() {
        return Ok(None);
    }

    let mut supplies: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    supplies.sort();

    let mains_online = supplies.iter().any(|dir| {
        matches!(read_trimmed(dir, "type").as_deref(), Some("Mains" | "USB"))
            && read_trimmed(dir, "online").as_deref() == Some("1")
    });

    for dir in supplies
        .iter()
        .filter(|dir| read_trimmed(dir, "type").as_deref() == Some("Battery"))
    {
        let Some(percent) = charge_percent(dir) else {
            continue;
        };
        let status = read_trimmed(dir, "status").unwrap_or_default();
        let charger_plugged = mains_online || matches!(status.as_str(), "Charging" | "Full");
        let time_left = if charger_plugged {
            BatteryTimeLeft::Unlimited
        } else {
            discharge_time_left(dir)
        };

        return Ok(Some(BatteryReading {
            percent,
            charger_plugged,
            time_left,
        }));
    }

    Ok(None)
}

/// Charge level from `capacity`, or computed from energy / charge counters.
fn charge_percent(dir: &Path) -> Option<f64> {
    if let Some(capacity) = read_number(dir, "capacity") {
        return Some(capacity.clamp(0.0, 100.0));
    }
    let (now, full) = read_number(dir, "energy_now")
        .zip(read_number(dir, "energy_full"))
        .or_else(|| read_number(dir, "charge_now").zip(read_number(dir, "charge_full")))?;
    if full <= 0.0 {
        return None;
    }
    Some((now / full * 100.0).clamp(0.0, 100.0))
}

/// Seconds until empty at the current discharge rate.
fn discharge_time_left(dir: &Path) -> BatteryTimeLeft {
    let estimate = read_number(dir, "energy_now")
        .zip(read_number(dir, "power_now"))
        .or_else(|| read_number(dir, "charge_now").zip(read_number(dir, "current_now")));

    match estimate {
        Some((remaining, rate)) if rate > 0.0 => {
            BatteryTimeLeft::Seconds((remaining / rate * SECS_PER_HOUR) as u64)
        }
        _ => BatteryTimeLeft::Unknown,
    }
}

fn read_trimmed(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name))
        .ok()
        .map(|s| s.trim().to_string())
}

fn read_number(dir: &Path, name: &str) -> Option<f64> {
    read_trimmed(dir, name)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
