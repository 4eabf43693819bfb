//! Alert dispatch: dedup the batch, persist state, send one message.
//!
//! State is recorded before the send is attempted and is not rolled back if
//! delivery fails. A failed send therefore suppresses those symbols for the
//! rest of the cool-down window.

use chrono::{DateTime, Utc};

use smartmoney_core::alert::{AlertDeduplicator, AlertStore};
use smartmoney_core::domain::Classification;
use smartmoney_core::notify::{format_alert_message, Notifier, NotifyError};

/// What happened to the notification for one batch.
#[derive(Debug)]
pub enum Delivery {
    /// No eligible classifications; nothing was sent.
    NothingToSend,
    /// Alerts are switched off; eligible symbols were recorded but not sent.
    Disabled,
    Sent,
    Failed(NotifyError),
}

impl Delivery {
    pub fn is_failed(&self) -> bool {
        matches!(self, Delivery::Failed(_))
    }
}

#[derive(Debug)]
pub struct DispatchReport {
    /// Symbols that passed dedup, in batch order.
    pub alerted: Vec<String>,
    /// Directional classifications held back by the cool-down window.
    pub suppressed: usize,
    pub delivery: Delivery,
    /// Set when alert state could not be persisted.
    pub state_error: Option<String>,
}

pub struct AlertDispatcher<'n> {
    dedup: AlertDeduplicator,
    notifier: &'n dyn Notifier,
}

impl<'n> AlertDispatcher<'n> {
    pub fn new(dedup: AlertDeduplicator, notifier: &'n dyn Notifier) -> Self {
        Self { dedup, notifier }
    }

    pub fn dispatch(
        &self,
        store: &mut dyn AlertStore,
        batch: &[Classification],
        now: DateTime<Utc>,
    ) -> DispatchReport {
        let eligible = self.dedup.filter(store, batch, now);
        let directional = batch.iter().filter(|c| c.is_directional()).count();
        let alerted: Vec<String> = eligible.iter().map(|c| c.symbol.clone()).collect();

        let state_error = match store.flush() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist alert state");
                Some(e.to_string())
            }
        };

        let delivery = if eligible.is_empty() {
            tracing::debug!("no eligible alerts this scan");
            Delivery::NothingToSend
        } else if !self.notifier.is_enabled() {
            tracing::debug!(count = eligible.len(), "alerts disabled, nothing sent");
            Delivery::Disabled
        } else {
            let text = format_alert_message(&eligible);
            let channel = self.notifier.name();
            match self.notifier.send(&text) {
                Ok(()) => {
                    tracing::info!(channel, count = eligible.len(), "alert sent");
                    Delivery::Sent
                }
                Err(e) => {
                    tracing::error!(channel, error = %e, "alert delivery failed");
                    Delivery::Failed(e)
                }
            }
        };

        DispatchReport {
            suppressed: directional - alerted.len(),
            alerted,
            delivery,
            state_error,
        }
    }
}
