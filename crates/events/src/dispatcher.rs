//! Best-effort alert dispatch.
//!
//! Persistence is on the critical path of a collection cycle; notification
//! is not. [`AlertDispatcher::dispatch`] therefore never returns an error:
//! channel failures are logged and reported as [`DispatchOutcome::Failed`].

use async_trait::async_trait;
use sysmon_core::alert::Alert;

use crate::delivery::email::EmailError;

/// Error raised by a delivery channel.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Email(#[from] EmailError),

    /// Failure in a channel that has no dedicated error type.
    #[error("Channel error: {0}")]
    Channel(String),
}

/// A channel that can deliver a composite alert.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    async fn send(&self, alert: &Alert) -> Result<(), DispatchError>;
}

/// What happened to an alert handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    /// The channel reported an error; it has been logged.
    Failed,
    /// No channel is configured, so nothing was sent.
    NotConfigured,
}

/// Routes alerts to the configured channel.
pub struct AlertDispatcher {
    channel: Option<Box<dyn AlertChannel>>,
}

impl AlertDispatcher {
    pub fn new(channel: Box<dyn AlertChannel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// A dispatcher with no channel. Alerts are logged and dropped.
    pub fn disabled() -> Self {
        Self { channel: None }
    }

    /// Send one alert, containing any channel failure.
    pub async fn dispatch(&self, alert: &Alert) -> DispatchOutcome {
        let Some(channel) = self.channel.as_deref() else {
            tracing::warn!(
                subject = %alert.subject,
                "Alert not delivered: no notification channel configured"
            );
            return DispatchOutcome::NotConfigured;
        };

        match channel.send(alert).await {
            Ok(()) => {
                tracing::info!(channel = channel.name(), subject = %alert.subject, "Alert dispatched");
                DispatchOutcome::Sent
            }
            Err(e) => {
                tracing::error!(
                    channel = channel.name(),
                    subject = %alert.subject,
                    error = %e,
                    "Alert dispatch failed"
                );
                DispatchOutcome::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::NaiveDate;
    use sysmon_core::alert::AlertKind;

    use super::*;

    struct CountingChannel {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl AlertChannel for CountingChannel {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn send(&self, _alert: &Alert) -> Result<(), DispatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DispatchError::Channel("relay unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn make_alert() -> Alert {
        Alert {
            kinds: vec![AlertKind::LowBattery],
            subject: "System Alert: Low Battery".to_string(),
            body: String::new(),
            triggered_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn successful_send_reports_sent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = AlertDispatcher::new(Box::new(CountingChannel {
            calls: Arc::clone(&calls),
            fail: false,
        }));

        assert_eq!(dispatcher.dispatch(&make_alert()).await, DispatchOutcome::Sent);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn channel_failure_is_contained() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = AlertDispatcher::new(Box::new(CountingChannel {
            calls: Arc::clone(&calls),
            fail: true,
        }));

        assert_eq!(dispatcher.dispatch(&make_alert()).await, DispatchOutcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_dispatcher_reports_not_configured() {
        let dispatcher = AlertDispatcher::disabled();
        assert_eq!(
            dispatcher.dispatch(&make_alert()).await,
            DispatchOutcome::NotConfigured
        );
    }

    #[test]
    fn dispatch_error_display() {
        let err = DispatchError::Channel("boom".to_string());
        assert_eq!(err.to_string(), "Channel error: boom");
    }
}
