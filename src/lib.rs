//! # enginewatch
//!
//! Predictive-maintenance monitor for a small engine instrumented by a
//! serial-attached microcontroller.
//!
//! Readings of RPM, temperature and vibration are polled from a data source,
//! checked against operator thresholds and fed to a short RPM window whose
//! statistics point at probable faults. Threshold crossings are pushed to a
//! Telegram chat, and a bounded sample table backs the end-of-run summary
//! and CSV export.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ source ◀── StreamSource (serial, replay) | SimulatedSource     │
//! │   │        | ChannelSource                                     │
//! │   ▼                                                            │
//! │ monitor ──▶ data (window, analysis, health, table)             │
//! │   │                                                            │
//! │   ├──▶ alert (latches, message, Notifier ──▶ Telegram)         │
//! │   └──▶ report (summary, CSV)                                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the [`DataSource`] trait and its implementations
//! - **[`data`]**: RPM window, fault heuristic, thresholds and sample table
//! - **[`alert`]**: alert composition and delivery
//! - **[`monitor`]**: the polling loop and session state
//! - **[`report`]**: summary and CSV export
//! - **[`faults`]**: scenarios for the fault simulator
//! - **[`config`]**: layered settings
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Monitor the first detected microcontroller port
//! enginewatch
//!
//! # Run against synthetic readings, no alerts, export the samples
//! enginewatch --simulate --no-telegram --export samples.csv
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use std::time::Duration;
//! use enginewatch::{ChannelSource, Monitor, Reading, Thresholds};
//!
//! # tokio_test::block_on(async {
//! let (tx, source) = ChannelSource::create("bench rig", 16);
//! tx.send(Reading::new(2400.0, 82.0, 1.4)).await.unwrap();
//! drop(tx);
//!
//! let mut monitor = Monitor::new(Box::new(source), Thresholds::default(), 30);
//! let outcome = monitor.run(10, Duration::from_millis(1)).await;
//! assert_eq!(outcome.readings, 1);
//! # });
//! ```
//!
//! ### Analysing a window of RPM values directly
//!
//! ```
//! use enginewatch::{predict_fault, Fault};
//!
//! let prediction = predict_fault(115.0, 2400.0, 1.0, &[2400.0, 2410.0, 2395.0]);
//! assert_eq!(prediction.primary, Some(Fault::EngineOverload));
//! ```

pub mod alert;
pub mod config;
pub mod data;
pub mod error;
pub mod faults;
pub mod monitor;
pub mod report;
pub mod source;

pub use alert::{AlertKind, AlertLatch, Notifier, RecordingNotifier, TelegramNotifier};
pub use config::Settings;
pub use data::{
    analyze_rpm, predict_fault, Fault, HealthStatus, Irregularity, Prediction, RpmAnalysis,
    RpmWindow, Sample, SampleTable, TableSummary, Thresholds,
};
pub use error::{AlertError, ParseError, ReportError, SourceError};
pub use faults::FaultScenario;
pub use monitor::{Monitor, Observation, RunOutcome, StopReason};
pub use source::{ChannelSource, DataSource, Reading, SimulatedSource, StreamSource};
