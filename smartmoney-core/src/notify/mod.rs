//! Notification channels.
//!
//! A channel accepts one formatted text payload per batch and reports whether
//! it was delivered. There are no retries: a failed send is reported to the
//! caller and the batch is not re-sent in the same scan.

pub mod message;
pub mod telegram;

use thiserror::Error;

pub use message::{escape_html, format_alert_message};
pub use telegram::TelegramNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification channel not configured: {0}")]
    NotConfigured(String),

    #[error("notification rejected with HTTP {status}")]
    Rejected { status: u16 },

    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Trait for notification channels.
pub trait Notifier: Send + Sync {
    /// Human-readable name of this channel.
    fn name(&self) -> &str;

    /// Deliver `text`. `Ok(())` only when the channel accepted it.
    fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// `false` for channels that are switched off. Callers skip `send` for them.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Prints the payload to stdout instead of delivering it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, text: &str) -> Result<(), NotifyError> {
        println!("{text}");
        Ok(())
    }
}

/// Drops every payload. Used when alerts are switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn name(&self) -> &str {
        "none"
    }

    fn send(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
