//! `sysmon-agent` -- runs one host metrics collection cycle.
//!
//! Samples CPU, memory and battery, appends the sample to the SQLite store,
//! evaluates the latest stored row against the configured thresholds and
//! emails a composite alert on breach. Scheduling is external (cron, a
//! systemd timer, ...); each invocation runs exactly one cycle.
//!
//! Exits with status 1 when configuration is invalid or the cycle fails
//! (sampling, persistence, or reading the stored row back for evaluation;
//! the log line says whether the sample was stored). A failed alert email
//! is logged but does not change the exit status.
//!
//! See [`sysmon_agent::config::AgentConfig::from_env`] for the environment
//! variables.

use sysmon_agent::collector::SystemSampler;
use sysmon_agent::config::AgentConfig;
use sysmon_agent::runner::{CollectionRunner, CycleError};
use sysmon_events::{AlertDispatcher, EmailDelivery};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sysmon_agent=info,sysmon_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        database = %config.database_path.display(),
        max_cpu_percent = config.thresholds.max_cpu_percent,
        max_ram_percent = config.thresholds.max_ram_percent,
        min_battery_percent = config.thresholds.min_battery_percent,
        email_enabled = config.email.is_some(),
        "Starting sysmon-agent",
    );

    let pool = sysmon_db::create_pool(&config.database_path)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to open metrics database");
            std::process::exit(1);
        });

    if let Err(e) = sysmon_db::initialize(&pool).await {
        tracing::error!(error = %e, "Failed to initialise metrics schema");
        std::process::exit(1);
    }

    let dispatcher = match config.email.clone() {
        Some(email) => AlertDispatcher::new(Box::new(EmailDelivery::new(email))),
        None => AlertDispatcher::disabled(),
    };

    let sampler = SystemSampler::new(config.power_supply_path.clone());
    let mut runner = CollectionRunner::new(sampler, pool.clone(), config.thresholds, dispatcher);

    let result = runner.run_cycle().await;
    pool.close().await;

    match result {
        Ok(report) => {
            tracing::info!(
                sample_id = report.inserted_id,
                evaluation = ?report.evaluation,
                "Collection cycle complete"
            );
        }
        Err(CycleError::Evaluation { inserted_id, source }) => {
            tracing::error!(
                sample_id = inserted_id,
                error = %source,
                "Sample stored, but threshold evaluation failed"
            );
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Collection cycle aborted");
            std::process::exit(1);
        }
    }
}
