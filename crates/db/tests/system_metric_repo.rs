//! Integration tests for the `system_metrics` store.
//!
//! Each test opens a fresh SQLite file inside a temporary directory:
//! - Schema initialisation is idempotent
//! - Insert / latest round-trip, with and without a battery
//! - Chart windows and the full timeline come back oldest first
//! - CPU time distribution of the latest row

use futures::TryStreamExt;
use sysmon_core::sample::{BatteryReading, BatteryTimeLeft, Sample};
use sysmon_db::repositories::system_metric_repo::DEFAULT_CHART_WINDOW;
use sysmon_db::repositories::SystemMetricRepo;
use sysmon_db::DbPool;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_store() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = sysmon_db::create_pool(dir.path().join("metrics.db"))
        .await
        .expect("pool should open");
    sysmon_db::initialize(&pool).await.expect("schema should initialise");
    (dir, pool)
}

fn make_sample(cpu_percent: f64, battery: Option<BatteryReading>) -> Sample {
    Sample {
        cpu_percent,
        cpu_time_user: 5123.75,
        cpu_time_system: 1201.5,
        cpu_time_idle: 80210.25,
        mem_total: 17_179_869_184,
        mem_avail: 6_442_450_944,
        mem_used: 10_200_000_000,
        mem_percent: 62.5,
        battery,
    }
}

fn laptop_battery() -> BatteryReading {
    BatteryReading {
        percent: 47.0,
        charger_plugged: true,
        time_left: BatteryTimeLeft::Unlimited,
    }
}

// ---------------------------------------------------------------------------
// Tests: schema
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initialize_is_idempotent() {
    let (_dir, pool) = open_store().await;

    for _ in 0..3 {
        sysmon_db::initialize(&pool).await.expect("re-initialise should succeed");
    }

    let (tables,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'system_metrics'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(tables, 1);
}

#[tokio::test]
async fn initialize_keeps_existing_rows() {
    let (_dir, pool) = open_store().await;
    SystemMetricRepo::insert(&pool, &make_sample(12.0, None))
        .await
        .unwrap();

    sysmon_db::initialize(&pool).await.unwrap();

    assert_eq!(SystemMetricRepo::count(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Tests: insert / latest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn latest_on_empty_store_is_none() {
    let (_dir, pool) = open_store().await;
    assert!(SystemMetricRepo::latest(&pool).await.unwrap().is_none());
}

#[tokio::test]
async fn insert_then_latest_round_trips_with_battery() {
    let (_dir, pool) = open_store().await;
    let sample = make_sample(33.5, Some(laptop_battery()));

    let id = SystemMetricRepo::insert(&pool, &sample).await.unwrap();
    let stored = SystemMetricRepo::latest(&pool)
        .await
        .unwrap()
        .expect("row should exist");

    assert_eq!(stored.id, id);
    assert_eq!(stored.sample, sample);
}

#[tokio::test]
async fn insert_then_latest_round_trips_without_battery() {
    let (_dir, pool) = open_store().await;
    let sample = make_sample(71.25, None);

    SystemMetricRepo::insert(&pool, &sample).await.unwrap();
    let stored = SystemMetricRepo::latest(&pool).await.unwrap().unwrap();

    assert_eq!(stored.sample, sample);
    assert!(stored.sample.battery.is_none());
}

#[tokio::test]
async fn battery_time_left_seconds_round_trip() {
    let (_dir, pool) = open_store().await;
    let battery = BatteryReading {
        percent: 18.0,
        charger_plugged: false,
        time_left: BatteryTimeLeft::Seconds(2700),
    };
    SystemMetricRepo::insert(&pool, &make_sample(5.0, Some(battery.clone())))
        .await
        .unwrap();

    let stored = SystemMetricRepo::latest(&pool).await.unwrap().unwrap();
    assert_eq!(stored.sample.battery, Some(battery));
}

#[tokio::test]
async fn latest_breaks_same_second_ties_by_id() {
    let (_dir, pool) = open_store().await;

    // Rows written back to back usually share a one-second timestamp.
    SystemMetricRepo::insert(&pool, &make_sample(10.0, None)).await.unwrap();
    SystemMetricRepo::insert(&pool, &make_sample(20.0, None)).await.unwrap();
    let last_id = SystemMetricRepo::insert(&pool, &make_sample(30.0, None))
        .await
        .unwrap();

    let stored = SystemMetricRepo::latest(&pool).await.unwrap().unwrap();
    assert_eq!(stored.id, last_id);
    assert_eq!(stored.sample.cpu_percent, 30.0);
}

#[tokio::test]
async fn latest_orders_by_timestamp_not_insert_order() {
    let (_dir, pool) = open_store().await;

    let newer = SystemMetricRepo::insert(&pool, &make_sample(10.0, None)).await.unwrap();
    let older = SystemMetricRepo::insert(&pool, &make_sample(20.0, None)).await.unwrap();

    // Simulate a backwards clock adjustment on the second insert.
    sqlx::query("UPDATE system_metrics SET timestamp = '2001-01-01 00:00:00' WHERE id = ?1")
        .bind(older)
        .execute(&pool)
        .await
        .unwrap();

    let stored = SystemMetricRepo::latest(&pool).await.unwrap().unwrap();
    assert_eq!(stored.id, newer);
}

// ---------------------------------------------------------------------------
// Tests: chart queries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recent_window_returns_last_rows_ascending() {
    let (_dir, pool) = open_store().await;
    for cpu in 1..=8 {
        SystemMetricRepo::insert(&pool, &make_sample(f64::from(cpu), None))
            .await
            .unwrap();
    }

    let window = SystemMetricRepo::recent_window(&pool, 3).await.unwrap();
    let cpus: Vec<f64> = window.iter().map(|s| s.sample.cpu_percent).collect();
    assert_eq!(cpus, vec![6.0, 7.0, 8.0]);
}

#[tokio::test]
async fn recent_window_larger_than_table_returns_everything() {
    let (_dir, pool) = open_store().await;
    for cpu in [4.0, 5.0] {
        SystemMetricRepo::insert(&pool, &make_sample(cpu, None)).await.unwrap();
    }

    let window = SystemMetricRepo::recent_window(&pool, DEFAULT_CHART_WINDOW)
        .await
        .unwrap();
    assert_eq!(window.len(), 2);
    assert!(window[0].id < window[1].id);
}

#[tokio::test]
async fn full_timeline_streams_all_rows_ascending() {
    let (_dir, pool) = open_store().await;
    for cpu in [3.0, 1.0, 2.0] {
        SystemMetricRepo::insert(&pool, &make_sample(cpu, None)).await.unwrap();
    }

    let timeline: Vec<_> = SystemMetricRepo::full_timeline(&pool)
        .try_collect()
        .await
        .unwrap();
    let cpus: Vec<f64> = timeline.iter().map(|s| s.sample.cpu_percent).collect();
    assert_eq!(cpus, vec![3.0, 1.0, 2.0]);
}

#[tokio::test]
async fn cpu_time_distribution_defaults_to_zero_when_empty() {
    let (_dir, pool) = open_store().await;
    let dist = SystemMetricRepo::cpu_time_distribution(&pool).await.unwrap();
    assert_eq!(dist, Default::default());
}

#[tokio::test]
async fn cpu_time_distribution_reads_latest_row() {
    let (_dir, pool) = open_store().await;
    SystemMetricRepo::insert(&pool, &make_sample(9.0, None)).await.unwrap();

    let dist = SystemMetricRepo::cpu_time_distribution(&pool).await.unwrap();
    assert_eq!(dist.user, 5123.75);
    assert_eq!(dist.system, 1201.5);
    assert_eq!(dist.idle, 80210.25);
}

#[tokio::test]
async fn reader_pool_sees_writes_from_another_pool() {
    let (dir, writer) = open_store().await;
    let reader = sysmon_db::create_pool(dir.path().join("metrics.db"))
        .await
        .unwrap();

    SystemMetricRepo::insert(&writer, &make_sample(42.0, None)).await.unwrap();

    let stored = SystemMetricRepo::latest(&reader).await.unwrap().unwrap();
    assert_eq!(stored.sample.cpu_percent, 42.0);
}
