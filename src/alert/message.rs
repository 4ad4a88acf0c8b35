//! Alert text composition.
//!
//! Messages use Telegram's legacy `Markdown` parse mode, so bold text is
//! wrapped in single asterisks.

use chrono::NaiveDateTime;

use crate::data::{Fault, Irregularity, Prediction, Thresholds};
use crate::source::Reading;

/// Kinds of threshold alert, each sent at most once per monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertKind {
    TemperatureHigh,
    RpmHigh,
    RpmLow,
    VibrationHigh,
}

impl AlertKind {
    pub const ALL: [AlertKind; 4] = [
        AlertKind::TemperatureHigh,
        AlertKind::RpmHigh,
        AlertKind::RpmLow,
        AlertKind::VibrationHigh,
    ];

    /// Whether `reading` crosses this alert's threshold.
    pub fn is_triggered(&self, reading: &Reading, thresholds: &Thresholds) -> bool {
        match self {
            AlertKind::TemperatureHigh => reading.temperature > thresholds.temp_max,
            AlertKind::RpmHigh => reading.rpm > thresholds.rpm_max,
            AlertKind::RpmLow => reading.rpm < thresholds.rpm_min,
            AlertKind::VibrationHigh => reading.vibration > thresholds.vib_high,
        }
    }

    /// Alert body describing the offending value and its context.
    pub fn body(&self, reading: &Reading, thresholds: &Thresholds) -> String {
        let Reading {
            rpm,
            temperature,
            vibration,
            ..
        } = *reading;

        match self {
            AlertKind::TemperatureHigh => format!(
                "🚨 ALERT: Critical temperature detected\n\n\
                 • Current value: {temperature:.1}°C\n\
                 • Maximum threshold: {}°C\n\
                 • RPM: {rpm:.0}\n\
                 • Vibration: {vibration:.1} m/s²",
                thresholds.temp_max
            ),
            AlertKind::RpmHigh => format!(
                "🚨 ALERT: Critical RPM detected\n\n\
                 • Current value: {rpm:.0} RPM\n\
                 • Maximum threshold: {} RPM\n\
                 • Temperature: {temperature:.1}°C\n\
                 • Vibration: {vibration:.1} m/s²",
                thresholds.rpm_max
            ),
            AlertKind::RpmLow => format!(
                "⚠️ WARNING: Low RPM detected\n\n\
                 • Current value: {rpm:.0} RPM\n\
                 • Minimum threshold: {} RPM\n\
                 • Temperature: {temperature:.1}°C\n\
                 • Vibration: {vibration:.1} m/s²",
                thresholds.rpm_min
            ),
            AlertKind::VibrationHigh => format!(
                "🚨 ALERT: Critical vibration detected\n\n\
                 • Current value: {vibration:.1} m/s²\n\
                 • Maximum threshold: {} m/s²\n\
                 • Temperature: {temperature:.1}°C\n\
                 • RPM: {rpm:.0}",
                thresholds.vib_high
            ),
        }
    }
}

/// Wrap `body` with a timestamp header and the fault analysis.
///
/// The irregularity list, primary fault and recommendation are only added
/// when there is something to report.
pub fn compose<I>(
    now: NaiveDateTime,
    body: &str,
    irregularities: I,
    primary: Option<Fault>,
) -> String
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    let mut text = format!(
        "🕒 {}\n⏰ Time: {}\n\n{}",
        now.format("%A, %d %B %Y"),
        now.format("%H:%M:%S"),
        body
    );

    let mut any_irregularity = false;
    for (i, irregularity) in irregularities.into_iter().enumerate() {
        if i == 0 {
            text.push_str("\n\n🔍 *Irregularities detected:*");
        }
        text.push_str(&format!("\n• {}", irregularity));
        any_irregularity = true;
    }

    if let Some(fault) = primary {
        text.push_str(&format!("\n\n⚠️ *Most probable fault:* {}", fault));
    }

    if any_irregularity || primary.is_some() {
        text.push_str("\n\n🔧 *Recommendation:* Check the system immediately");
    }

    text
}

/// Compose a threshold alert for the given reading and prediction.
pub fn threshold_alert(
    now: NaiveDateTime,
    kind: AlertKind,
    reading: &Reading,
    thresholds: &Thresholds,
    prediction: &Prediction,
) -> String {
    compose(
        now,
        &kind.body(reading, thresholds),
        &prediction.irregularities,
        prediction.primary,
    )
}

/// The fixed message used to check the alert path end to end.
pub fn test_alert(now: NaiveDateTime) -> String {
    let sample = [
        Irregularity::HighVariation(18.2).to_string(),
        "Irregular pattern detected".to_string(),
    ];
    compose(
        now,
        "🔧 Test alert from predictive maintenance\n✅ Fault detection system active",
        &sample,
        Some(Fault::WornSparkPlugs),
    )
}
