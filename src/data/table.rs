//! Bounded table of timestamped samples.

use std::collections::VecDeque;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use super::stats;
use crate::source::Reading;

/// Default number of samples kept for the summary and export.
pub const DEFAULT_TABLE_CAPACITY: usize = 30;

/// One row of the sample table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Hour of day with minutes as a fraction (`14.5` is 14:30).
    pub hour: f64,
    pub rpm: f64,
    #[serde(rename = "temperature_c")]
    pub temperature: f64,
    #[serde(rename = "vibration_ms2")]
    pub vibration: f64,
}

impl Sample {
    pub fn new(time: NaiveTime, reading: &Reading) -> Self {
        Self {
            hour: fractional_hour(time),
            rpm: reading.rpm,
            temperature: reading.temperature,
            vibration: reading.vibration,
        }
    }
}

/// Hour of day plus minutes / 60.
pub fn fractional_hour(time: NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0
}

/// Aggregate figures over the sample table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub samples: usize,
    pub max_temperature: f64,
    pub mean_temperature: f64,
    pub max_rpm: f64,
    pub mean_rpm: f64,
    pub min_rpm: f64,
    /// Sample standard deviation of RPM over its mean, in percent.
    pub rpm_variation_pct: f64,
}

/// Samples in arrival order, oldest evicted once `capacity` is exceeded.
#[derive(Debug, Clone)]
pub struct SampleTable {
    rows: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SampleTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_CAPACITY)
    }
}

impl SampleTable {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.rows.push_back(sample);
        while self.rows.len() > self.capacity {
            self.rows.pop_front();
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Sample> {
        self.rows.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.rows.back()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Summary statistics, or `None` when the table is empty.
    pub fn summary(&self) -> Option<TableSummary> {
        if self.rows.is_empty() {
            return None;
        }

        let temps: Vec<f64> = self.rows.iter().map(|s| s.temperature).collect();
        let rpms: Vec<f64> = self.rows.iter().map(|s| s.rpm).collect();

        let mean_rpm = stats::mean(&rpms)?;
        let rpm_variation_pct = match stats::sample_std(&rpms) {
            Some(std) if mean_rpm > 0.0 => std / mean_rpm * 100.0,
            _ => 0.0,
        };

        Some(TableSummary {
            samples: self.rows.len(),
            max_temperature: stats::max(&temps)?,
            mean_temperature: stats::mean(&temps)?,
            max_rpm: stats::max(&rpms)?,
            mean_rpm,
            min_rpm: stats::min(&rpms)?,
            rpm_variation_pct,
        })
    }
}
