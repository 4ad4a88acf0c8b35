//! Alert delivery.
//!
//! Alerts are composed by [`message`], delivered by a [`Notifier`] and
//! rate-limited by an [`AlertLatch`] so each kind fires once per run.

pub mod message;
pub mod telegram;

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

pub use message::AlertKind;
pub use telegram::{TelegramNotifier, TelegramSettings};

use crate::error::AlertError;

/// A destination for alert text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert.
    async fn send(&self, text: &str) -> Result<(), AlertError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Remembers which alert kinds already fired during the current run.
#[derive(Debug, Default, Clone)]
pub struct AlertLatch {
    fired: BTreeSet<AlertKind>,
}

impl AlertLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kind` as fired. Returns `false` if it had already fired.
    pub fn trip(&mut self, kind: AlertKind) -> bool {
        self.fired.insert(kind)
    }

    pub fn has_fired(&self, kind: AlertKind) -> bool {
        self.fired.contains(&kind)
    }

    pub fn reset(&mut self) {
        self.fired.clear();
    }
}

/// Notifier that keeps every message in memory.
///
/// Handy for dry runs and for exercising the monitor loop in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far.
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), AlertError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory recorder".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_fires_once() {
        let mut latch = AlertLatch::new();
        assert!(latch.trip(AlertKind::TemperatureHigh));
        assert!(!latch.trip(AlertKind::TemperatureHigh));
        assert!(latch.trip(AlertKind::RpmLow));
        assert!(latch.has_fired(AlertKind::TemperatureHigh));
        assert!(!latch.has_fired(AlertKind::VibrationHigh));

        latch.reset();
        assert!(latch.trip(AlertKind::TemperatureHigh));
    }

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.send("one").await.unwrap();
        notifier.send("two").await.unwrap();
        assert_eq!(notifier.messages(), vec!["one", "two"]);
    }
}
