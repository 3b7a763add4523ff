//! Threshold evaluation engine for host samples.
//!
//! Pure logic, no database access. The caller reads the latest stored
//! sample and passes it in together with the [`ThresholdConfig`] loaded at
//! startup. At most one composite [`Alert`] is produced per evaluation, with
//! sections always in CPU, RAM, Battery order.

use crate::alert::{Alert, AlertKind, SUBJECT_PREFIX};
use crate::error::CoreError;
use crate::sample::StoredSample;
use crate::threshold_validation::validate_percent_range;

/// Default CPU limit (inclusive).
pub const DEFAULT_MAX_CPU_PERCENT: f64 = 90.0;

/// Default RAM limit (inclusive).
pub const DEFAULT_MAX_RAM_PERCENT: f64 = 90.0;

/// Default battery floor (inclusive).
pub const DEFAULT_MIN_BATTERY_PERCENT: f64 = 20.0;

/// Display format for the timestamp line at the top of an alert body.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Limits a sample is checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    pub max_cpu_percent: f64,
    pub max_ram_percent: f64,
    pub min_battery_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_cpu_percent: DEFAULT_MAX_CPU_PERCENT,
            max_ram_percent: DEFAULT_MAX_RAM_PERCENT,
            min_battery_percent: DEFAULT_MIN_BATTERY_PERCENT,
        }
    }
}

impl ThresholdConfig {
    /// Load thresholds through a key lookup, falling back to defaults.
    ///
    /// | Variable              | Default |
    /// |-----------------------|---------|
    /// | `MAX_CPU_PERCENT`     | `90.0`  |
    /// | `MAX_RAM_PERCENT`     | `90.0`  |
    /// | `MIN_BATTERY_PERCENT` | `20.0`  |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            max_cpu_percent: parse_percent(&lookup, "MAX_CPU_PERCENT", DEFAULT_MAX_CPU_PERCENT)?,
            max_ram_percent: parse_percent(&lookup, "MAX_RAM_PERCENT", DEFAULT_MAX_RAM_PERCENT)?,
            min_battery_percent: parse_percent(
                &lookup,
                "MIN_BATTERY_PERCENT",
                DEFAULT_MIN_BATTERY_PERCENT,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every limit lies within `[0, 100]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_percent_range(self.max_cpu_percent, "max_cpu_percent")?;
        validate_percent_range(self.max_ram_percent, "max_ram_percent")?;
        validate_percent_range(self.min_battery_percent, "min_battery_percent")?;
        Ok(())
    }
}

fn parse_percent<F>(lookup: &F, key: &str, default: f64) -> Result<f64, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!("{key} must be a number, got '{raw}'"))
        }),
    }
}

/// List the breaches present in a sample, in section order.
///
/// The battery check is skipped when the sample has no battery reading.
pub fn breaches(latest: &StoredSample, config: &ThresholdConfig) -> Vec<AlertKind> {
    let sample = &latest.sample;
    let mut kinds = Vec::new();

    if sample.cpu_percent >= config.max_cpu_percent {
        kinds.push(AlertKind::HighCpu);
    }
    if sample.mem_percent >= config.max_ram_percent {
        kinds.push(AlertKind::HighRam);
    }
    if let Some(battery) = sample.battery_percent() {
        if battery <= config.min_battery_percent {
            kinds.push(AlertKind::LowBattery);
        }
    }

    kinds
}

/// Evaluate the latest stored sample and build a composite alert.
///
/// Returns `None` when no limit is breached.
pub fn evaluate(latest: &StoredSample, config: &ThresholdConfig) -> Option<Alert> {
    let kinds = breaches(latest, config);
    if kinds.is_empty() {
        return None;
    }

    let tags: Vec<&str> = kinds.iter().map(|k| k.tag()).collect();
    let subject = format!("{SUBJECT_PREFIX}{}", tags.join(", "));

    let mut lines = vec![format!(
        "Timestamp: {}\n",
        latest.timestamp.format(TIMESTAMP_FORMAT)
    )];
    for kind in &kinds {
        push_section(&mut lines, *kind, latest, config);
    }
    push_general_tips(&mut lines);

    Some(Alert {
        kinds,
        subject,
        body: lines.join("\n"),
        triggered_at: latest.timestamp,
    })
}

fn push_section(
    lines: &mut Vec<String>,
    kind: AlertKind,
    latest: &StoredSample,
    config: &ThresholdConfig,
) {
    let sample = &latest.sample;
    let (headline, issues, suggestions): (String, &[&str], &[&str]) = match kind {
        AlertKind::HighCpu => (
            format!(
                "⚠️ CPU usage is above {:?}%: {:?}%",
                config.max_cpu_percent, sample.cpu_percent
            ),
            &[
                "Too many running processes or background apps",
                "A program may be stuck or consuming excess resources",
                "Outdated drivers or heavy workloads",
            ],
            &[
                "Close unnecessary programs or browser tabs",
                "Check the process list to identify high-usage processes",
                "Restart stuck apps or the system if needed",
                "Keep drivers updated",
                "Consider hardware upgrade or better cooling if this happens often",
            ],
        ),
        AlertKind::HighRam => (
            format!(
                "⚠️ RAM usage is above {:?}%: {:?}%",
                config.max_ram_percent, sample.mem_percent
            ),
            &[
                "Too many applications or browser tabs open",
                "Memory leaks from long-running apps",
                "Insufficient RAM for workload",
            ],
            &[
                "Close unused applications",
                "Restart the system to clear memory leaks",
                "Disable unnecessary startup programs",
                "Increase swap / virtual memory if needed",
                "Upgrade RAM if this issue is frequent",
            ],
        ),
        AlertKind::LowBattery => (
            format!(
                "⚠️ Battery is below {:?}%: {:?}%",
                config.min_battery_percent,
                sample.battery_percent().unwrap_or_default()
            ),
            &[
                "Battery draining quickly without charger",
                "Risk of sudden shutdown and data loss",
                "Battery wear over time",
            ],
            &[
                "Plug in the charger immediately",
                "Reduce screen brightness and close background apps",
                "Enable battery saver mode",
                "Avoid letting battery fully discharge often",
                "For long-term health, avoid keeping battery at 100% all the time when plugged in",
            ],
        ),
    };

    lines.push(headline);
    lines.push("\nPossible Issues:".to_string());
    lines.extend(issues.iter().map(|s| format!("- {s}")));
    lines.push("\nSuggestions:".to_string());
    let last = suggestions.len() - 1;
    for (i, s) in suggestions.iter().enumerate() {
        // Blank line after the last suggestion separates sections.
        if i == last {
            lines.push(format!("- {s}\n"));
        } else {
            lines.push(format!("- {s}"));
        }
    }
}

fn push_general_tips(lines: &mut Vec<String>) {
    lines.push("\n💡 General PC Health Tips:".to_string());
    lines.push("- Keep your OS and drivers updated".to_string());
    lines.push("- Run disk cleanup and antivirus scans periodically".to_string());
    lines.push("- Ensure good ventilation to avoid overheating".to_string());
    lines.push("- Backup important data regularly\n".to_string());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
