//! The monitoring session: polls a source, analyses each reading and
//! raises alerts.
//!
//! A [`Monitor`] owns the session state (RPM window, sample table, alert
//! latches and the "monitoring active" flag). [`Monitor::run`] drives a fixed
//! number of iterations with a sleep in between and stops early when the flag
//! is cleared or the source is exhausted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::alert::{message, AlertKind, AlertLatch, Notifier};
use crate::data::{
    analyze_rpm, predict_fault, HealthStatus, Prediction, RpmAnalysis, RpmWindow, Sample,
    SampleTable, Thresholds,
};
use crate::source::{DataSource, Reading};

/// Default number of loop iterations per run.
pub const DEFAULT_ITERATIONS: usize = 50;

/// Default pause between iterations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// What the monitor made of a single reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub reading: Reading,
    pub prediction: Prediction,
    pub status: HealthStatus,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All iterations ran.
    Completed,
    /// The active flag was cleared (e.g. Ctrl-C).
    Stopped,
    /// The source closed and will not produce more readings.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: StopReason,
    /// Loop passes executed.
    pub iterations: usize,
    /// Readings processed.
    pub readings: usize,
}

pub struct Monitor {
    source: Box<dyn DataSource>,
    thresholds: Thresholds,
    window: RpmWindow,
    table: SampleTable,
    notifier: Option<Arc<dyn Notifier>>,
    latch: AlertLatch,
    active: Arc<AtomicBool>,
    last_observation: Option<Observation>,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("source", &self.source.description())
            .field("samples", &self.table.len())
            .field("alerts", &self.notifier.as_ref().map(|n| n.describe()))
            .field("active", &self.is_active())
            .finish()
    }
}

impl Monitor {
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds, table_capacity: usize) -> Self {
        Self {
            source,
            thresholds,
            window: RpmWindow::new(),
            table: SampleTable::new(table_capacity),
            notifier: None,
            latch: AlertLatch::new(),
            active: Arc::new(AtomicBool::new(false)),
            last_observation: None,
        }
    }

    /// Enable alert delivery through `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.last_observation.as_ref()
    }

    /// Analysis of the RPM values currently in the window.
    pub fn window_analysis(&mut self) -> RpmAnalysis {
        analyze_rpm(self.window.values())
    }

    /// Shared flag that keeps the loop running; store `false` to stop it.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Ask a running loop to stop at its next pass.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Reset session state and mark monitoring active.
    pub fn start(&mut self) {
        self.window.clear();
        self.table.clear();
        self.latch.reset();
        self.last_observation = None;
        self.active.store(true, Ordering::SeqCst);
    }

    /// Analyse one reading, record it and send any alerts it triggers.
    pub async fn process(&mut self, reading: Reading, now: NaiveDateTime) -> Observation {
        if reading.temp_sensor_fault {
            warn!("Temperature sensor reported an error, using 0°C");
        }

        self.window.push(reading.rpm);
        self.table.push(Sample::new(now.time(), &reading));

        let prediction = predict_fault(
            reading.temperature,
            reading.rpm,
            reading.vibration,
            self.window.values(),
        );
        let status = self
            .thresholds
            .classify(&reading, prediction.has_irregularities());

        info!(
            rpm = reading.rpm,
            temperature = reading.temperature,
            vibration = reading.vibration,
            "{} {} | fault: {}",
            status.symbol(),
            status.verdict(),
            prediction.primary_label()
        );
        for irregularity in &prediction.irregularities {
            debug!(%irregularity, "irregularity detected");
        }

        self.send_alerts(&reading, &prediction, now).await;

        let observation = Observation {
            reading,
            prediction,
            status,
        };
        self.last_observation = Some(observation.clone());
        observation
    }

    async fn send_alerts(
        &mut self,
        reading: &Reading,
        prediction: &Prediction,
        now: NaiveDateTime,
    ) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };

        for kind in AlertKind::ALL {
            if !kind.is_triggered(reading, &self.thresholds) || !self.latch.trip(kind) {
                continue;
            }

            let text = message::threshold_alert(now, kind, reading, &self.thresholds, prediction);
            match notifier.send(&text).await {
                Ok(()) => info!(?kind, notifier = %notifier.describe(), "alert sent"),
                Err(e) => warn!(?kind, error = %e, "failed to send alert"),
            }
        }
    }

    /// Run the polling loop.
    ///
    /// Each pass polls the source once; passes without a reading still count
    /// toward `iterations`.
    pub async fn run(&mut self, iterations: usize, interval: Duration) -> RunOutcome {
        self.start();
        info!(
            source = %self.source.description(),
            iterations,
            interval_ms = interval.as_millis() as u64,
            "monitoring started"
        );

        let mut passes = 0;
        let mut readings = 0;
        let mut reported_error: Option<String> = None;

        let reason = loop {
            if passes >= iterations {
                break StopReason::Completed;
            }
            if !self.is_active() {
                break StopReason::Stopped;
            }

            match self.source.poll() {
                Some(reading) => {
                    self.process(reading, Local::now().naive_local()).await;
                    readings += 1;
                }
                None => {
                    if self.source.is_exhausted() {
                        warn!(source = %self.source.description(), "source closed, ending run");
                        break StopReason::Exhausted;
                    }
                    debug!("no reading available");
                }
            }

            let error = self.source.error();
            if error.is_some() && error != reported_error {
                if let Some(e) = &error {
                    warn!(source = %self.source.description(), error = %e, "source error");
                }
                reported_error = error;
            }

            passes += 1;
            if passes < iterations {
                tokio::time::sleep(interval).await;
            }
        };

        self.active.store(false, Ordering::SeqCst);
        info!(?reason, passes, readings, "monitoring finished");

        RunOutcome {
            reason,
            iterations: passes,
            readings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::RecordingNotifier;
    use crate::source::ChannelSource;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn monitor_with_channel(capacity: usize) -> (tokio::sync::mpsc::Sender<Reading>, Monitor) {
        let (tx, source) = ChannelSource::create("test", 64);
        (tx, Monitor::new(Box::new(source), Thresholds::default(), capacity))
    }

    #[tokio::test]
    async fn test_process_records_and_classifies() {
        let (_tx, mut monitor) = monitor_with_channel(30);
        monitor.start();

        let obs = monitor.process(Reading::new(2400.0, 80.0, 1.5), at(14, 30)).await;
        assert_eq!(obs.status, HealthStatus::Warning);
        assert_eq!(obs.prediction.primary, None);

        let obs = monitor.process(Reading::new(2400.0, 60.0, 1.0), at(14, 31)).await;
        assert_eq!(obs.status, HealthStatus::Healthy);

        assert_eq!(monitor.table().len(), 2);
        assert_eq!(monitor.table().rows().next().unwrap().hour, 14.5);
        assert_eq!(monitor.last_observation().unwrap().reading.temperature, 60.0);
    }

    #[tokio::test]
    async fn test_critical_reading_predicts_overload() {
        let (_tx, mut monitor) = monitor_with_channel(30);
        monitor.start();

        let obs = monitor.process(Reading::new(2400.0, 115.0, 1.0), at(9, 0)).await;
        assert_eq!(obs.status, HealthStatus::Critical);
        assert_eq!(obs.prediction.primary, Some(crate::data::Fault::EngineOverload));
    }

    #[tokio::test]
    async fn test_alerts_fire_once_per_run() {
        let (_tx, monitor) = monitor_with_channel(30);
        let notifier = Arc::new(RecordingNotifier::new());
        let mut monitor = monitor.with_notifier(notifier.clone());
        monitor.start();

        monitor.process(Reading::new(2400.0, 105.0, 1.0), at(10, 0)).await;
        monitor.process(Reading::new(2400.0, 108.0, 1.0), at(10, 1)).await;
        monitor.process(Reading::new(3300.0, 80.0, 4.5), at(10, 2)).await;

        let sent = notifier.messages();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains("Critical temperature"));
        assert!(sent[1].contains("Critical RPM"));
        assert!(sent[2].contains("Critical vibration"));

        // A new run re-arms the latches
        monitor.start();
        monitor.process(Reading::new(2400.0, 105.0, 1.0), at(11, 0)).await;
        assert_eq!(notifier.messages().len(), 4);
    }

    #[tokio::test]
    async fn test_no_alerts_without_notifier() {
        let (_tx, mut monitor) = monitor_with_channel(30);
        monitor.start();
        let obs = monitor.process(Reading::new(1200.0, 120.0, 5.0), at(8, 0)).await;
        assert_eq!(obs.status, HealthStatus::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes_iterations() {
        let (tx, mut monitor) = monitor_with_channel(30);
        for rpm in [2000.0, 2100.0, 2200.0] {
            tx.send(Reading::new(rpm, 80.0, 1.0)).await.unwrap();
        }

        let outcome = monitor.run(5, Duration::from_secs(1)).await;
        assert_eq!(outcome.reason, StopReason::Completed);
        assert_eq!(outcome.iterations, 5);
        assert_eq!(outcome.readings, 3);
        assert_eq!(monitor.table().len(), 3);
        assert!(!monitor.is_active());
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ends_when_source_exhausted() {
        let (tx, mut monitor) = monitor_with_channel(30);
        tx.send(Reading::new(2000.0, 80.0, 1.0)).await.unwrap();
        drop(tx);

        let outcome = monitor.run(50, Duration::from_secs(1)).await;
        assert_eq!(outcome.reason, StopReason::Exhausted);
        assert_eq!(outcome.readings, 1);
        assert_eq!(outcome.iterations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_flag_cleared() {
        let (_tx, mut monitor) = monitor_with_channel(30);
        let handle = monitor.stop_handle();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            handle.store(false, Ordering::SeqCst);
        });

        let outcome = monitor.run(50, Duration::from_secs(1)).await;
        assert_eq!(outcome.reason, StopReason::Stopped);
        assert!(outcome.iterations < 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_resets_previous_session() {
        let (tx, mut monitor) = monitor_with_channel(30);
        tx.send(Reading::new(2000.0, 80.0, 1.0)).await.unwrap();
        monitor.run(1, Duration::from_secs(1)).await;
        assert_eq!(monitor.table().len(), 1);

        monitor.run(1, Duration::from_secs(1)).await;
        assert!(monitor.table().is_empty());
        assert!(monitor.window_analysis().irregularities.is_empty());
    }

    #[tokio::test]
    async fn test_table_capacity_is_respected() {
        let (_tx, mut monitor) = monitor_with_channel(3);
        monitor.start();
        for minute in 0..5 {
            monitor.process(Reading::new(2000.0, 80.0, 1.0), at(12, minute)).await;
        }
        assert_eq!(monitor.table().len(), 3);
        assert_eq!(monitor.table().capacity(), 3);
    }
}
