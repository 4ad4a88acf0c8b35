//! Operator thresholds and overall health classification.

use serde::{Deserialize, Serialize};

use crate::source::Reading;

/// Thresholds for health status computation.
///
/// These are the operator-tunable limits; the fault heuristic in
/// [`analysis`](super::analysis) uses its own fixed limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Temperature (°C) above which a warning is raised.
    pub temp_min: f64,
    /// Temperature (°C) above which the engine is critical.
    pub temp_max: f64,
    /// RPM below which the engine is critical.
    pub rpm_min: f64,
    /// RPM above which the engine is critical.
    pub rpm_max: f64,
    /// Vibration (m/s²) above which a warning is raised.
    pub vib_medium: f64,
    /// Vibration (m/s²) above which the engine is critical.
    pub vib_high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_min: 70.0,
            temp_max: 100.0,
            rpm_min: 1800.0,
            rpm_max: 3200.0,
            vib_medium: 2.0,
            vib_high: 4.0,
        }
    }
}

/// Health status for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }

    /// Suffix used on status lines.
    pub fn verdict(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Normal",
            HealthStatus::Warning => "Warning",
            HealthStatus::Critical => "Critical condition!",
        }
    }
}

impl Thresholds {
    /// Classify a reading.
    ///
    /// Critical limits win over warnings; irregularities in the RPM window
    /// alone are enough for a warning.
    pub fn classify(&self, reading: &Reading, has_irregularities: bool) -> HealthStatus {
        if reading.temperature > self.temp_max
            || reading.rpm > self.rpm_max
            || reading.rpm < self.rpm_min
            || reading.vibration > self.vib_high
        {
            HealthStatus::Critical
        } else if reading.temperature > self.temp_min
            || reading.vibration > self.vib_medium
            || has_irregularities
        {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}
