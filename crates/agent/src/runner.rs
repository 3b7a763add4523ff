//! One collection cycle: sample, persist, evaluate the latest stored row,
//! dispatch.
//!
//! A failed sample aborts before anything is written. A failed insert
//! aborts before evaluation, so alerts only ever describe durable rows. A
//! failed read-back after a committed insert is reported separately: the
//! sample is stored, only the threshold check was lost. Dispatch is
//! best-effort and cannot fail the cycle. The runner keeps no
//! state between cycles beyond what the store holds.

use sysmon_core::thresholds::{self, ThresholdConfig};
use sysmon_core::types::DbId;
use sysmon_db::repositories::SystemMetricRepo;
use sysmon_db::DbPool;
use sysmon_events::{AlertDispatcher, DispatchOutcome};

use crate::collector::{MetricSampler, SamplingError};

/// Error that aborts a cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    /// The insert itself failed; nothing was stored.
    #[error("Persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),

    /// The sample was stored but the latest row could not be read back.
    #[error("Sample {inserted_id} stored, but evaluation failed: {source}")]
    Evaluation {
        inserted_id: DbId,
        #[source]
        source: sqlx::Error,
    },
}

/// Result of evaluating the latest stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The store holds no rows; nothing was evaluated.
    EmptyStore,
    /// Every metric is within its limit.
    WithinThresholds { sample_id: DbId },
    /// A composite alert was built and handed to the dispatcher.
    Alerted {
        sample_id: DbId,
        subject: String,
        outcome: DispatchOutcome,
    },
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Row id of the sample written by this cycle.
    pub inserted_id: DbId,
    pub evaluation: Evaluation,
}

/// Runs collection cycles against one store.
pub struct CollectionRunner<S> {
    sampler: S,
    pool: DbPool,
    thresholds: ThresholdConfig,
    dispatcher: AlertDispatcher,
}

impl<S: MetricSampler> CollectionRunner<S> {
    pub fn new(
        sampler: S,
        pool: DbPool,
        thresholds: ThresholdConfig,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            sampler,
            pool,
            thresholds,
            dispatcher,
        }
    }

    /// Run one full cycle.
    ///
    /// Takes `&mut self`, so a runner never has two cycles in flight.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        tracing::debug!("Collection cycle started");

        let sample = self.sampler.sample().await?;

        let inserted_id = SystemMetricRepo::insert(&self.pool, &sample).await?;
        tracing::info!(
            sample_id = inserted_id,
            cpu_percent = sample.cpu_percent,
            mem_percent = sample.mem_percent,
            battery_percent = ?sample.battery_percent(),
            "Sample persisted"
        );

        let evaluation = self
            .evaluate_latest()
            .await
            .map_err(|source| CycleError::Evaluation {
                inserted_id,
                source,
            })?;

        tracing::debug!(sample_id = inserted_id, "Collection cycle finished");
        Ok(CycleReport {
            inserted_id,
            evaluation,
        })
    }

    /// Read the latest stored row, evaluate it and dispatch any alert.
    pub async fn evaluate_latest(&self) -> Result<Evaluation, sqlx::Error> {
        let Some(latest) = SystemMetricRepo::latest(&self.pool).await? else {
            tracing::warn!("No metrics found in store, skipping evaluation");
            return Ok(Evaluation::EmptyStore);
        };

        let Some(alert) = thresholds::evaluate(&latest, &self.thresholds) else {
            tracing::info!(sample_id = latest.id, "All metrics within thresholds");
            return Ok(Evaluation::WithinThresholds {
                sample_id: latest.id,
            });
        };

        tracing::info!(
            sample_id = latest.id,
            subject = %alert.subject,
            "Threshold breach detected"
        );
        let outcome = self.dispatcher.dispatch(&alert).await;

        Ok(Evaluation::Alerted {
            sample_id: latest.id,
            subject: alert.subject,
            outcome,
        })
    }
}
