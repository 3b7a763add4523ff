//! Repository for the `system_metrics` table (append-only time-series).

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sysmon_core::sample::{Sample, StoredSample};
use sysmon_core::types::DbId;

use crate::models::system_metric::{CpuTimeDistribution, SystemMetric};
use crate::DbPool;

/// Number of rows the dashboard charts show by default.
pub const DEFAULT_CHART_WINDOW: u32 = 50;

/// Column list for `system_metrics` SELECT queries (includes `id` and `timestamp`).
const COLUMNS: &str = "\
    id, timestamp, cpu_percent, \
    cpu_time_user, cpu_time_system, cpu_time_idle, \
    mem_total, mem_avail, mem_used, mem_percent, \
    battery_percent, charger_plugged, battery_time_left";

/// Column list for INSERT statements (excludes auto-generated `id` and `timestamp`).
const INSERT_COLUMNS: &str = "\
    cpu_percent, cpu_time_user, cpu_time_system, cpu_time_idle, \
    mem_total, mem_avail, mem_used, mem_percent, \
    battery_percent, charger_plugged, battery_time_left";

/// Full history, oldest first. Kept as a literal because the stream
/// borrows the query text for its whole lifetime.
const TIMELINE_QUERY: &str = "\
    SELECT id, timestamp, cpu_percent, \
        cpu_time_user, cpu_time_system, cpu_time_idle, \
        mem_total, mem_avail, mem_used, mem_percent, \
        battery_percent, charger_plugged, battery_time_left \
    FROM system_metrics \
    ORDER BY timestamp ASC, id ASC";

/// Provides query operations for host samples.
pub struct SystemMetricRepo;

impl SystemMetricRepo {
    /// Append one sample. The store assigns the id and local timestamp.
    ///
    /// Returns the new row id.
    pub async fn insert(pool: &DbPool, sample: &Sample) -> Result<DbId, sqlx::Error> {
        let query = format!(
            "INSERT INTO system_metrics ({INSERT_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        );
        let battery = sample.battery.as_ref();

        let result = sqlx::query(&query)
            .bind(sample.cpu_percent)
            .bind(sample.cpu_time_user)
            .bind(sample.cpu_time_system)
            .bind(sample.cpu_time_idle)
            .bind(to_db_bytes(sample.mem_total))
            .bind(to_db_bytes(sample.mem_avail))
            .bind(to_db_bytes(sample.mem_used))
            .bind(sample.mem_percent)
            .bind(battery.map(|b| b.percent))
            .bind(battery.map(|b| b.charger_plugged))
            .bind(battery.map(|b| b.time_left.to_db()))
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// The most recent sample, or `None` if the store is empty.
    pub async fn latest(pool: &DbPool) -> Result<Option<StoredSample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM system_metrics \
             ORDER BY timestamp DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, SystemMetric>(&query)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(StoredSample::from))
    }

    /// The `limit` most recent samples, returned oldest first.
    pub async fn recent_window(
        pool: &DbPool,
        limit: u32,
    ) -> Result<Vec<StoredSample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ( \
                 SELECT {COLUMNS} FROM system_metrics \
                 ORDER BY timestamp DESC, id DESC LIMIT ?1 \
             ) AS latest \
             ORDER BY timestamp ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, SystemMetric>(&query)
            .bind(i64::from(limit))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(StoredSample::from).collect())
    }

    /// Stream every sample, oldest first.
    pub fn full_timeline(pool: &DbPool) -> BoxStream<'_, Result<StoredSample, sqlx::Error>> {
        sqlx::query_as::<_, SystemMetric>(TIMELINE_QUERY)
            .fetch(pool)
            .map_ok(StoredSample::from)
            .boxed()
    }

    /// CPU time split (system / user / idle) of the latest sample.
    pub async fn cpu_time_distribution(
        pool: &DbPool,
    ) -> Result<CpuTimeDistribution, sqlx::Error> {
        let row = sqlx::query_as::<_, CpuTimeDistribution>(
            "SELECT cpu_time_system AS system, cpu_time_user AS user, cpu_time_idle AS idle \
             FROM system_metrics \
             ORDER BY timestamp DESC, id DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await?;
        Ok(row.unwrap_or_default())
    }

    /// Total number of stored samples.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM system_metrics")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

/// SQLite integers are signed 64-bit; byte counts never get near the limit.
fn to_db_bytes(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}
