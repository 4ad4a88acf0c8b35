//! Telemetry readings and the serial line format.
//!
//! The microcontroller prints one line per measurement:
//!
//! ```text
//! RPM: 2450 | Temp: 86.5C | Vib: 2.3m/s² | NO VIBRATION
//! ```
//!
//! Segments are separated by `|`. Unknown segments are ignored, and a
//! temperature of `ERROR` marks a failed sensor.

use crate::error::ParseError;

const RPM_KEY: &str = "RPM:";
const TEMP_KEY: &str = "Temp:";
const VIB_KEY: &str = "Vib:";

/// Sentinel printed by the firmware when the temperature sensor fails.
const TEMP_ERROR_SENTINEL: &str = "ERROR";

/// One measurement from the engine sensors.
///
/// Fields that were missing from the source line are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    pub rpm: f64,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Metres per second squared.
    pub vibration: f64,
    /// Set when the firmware reported `ERROR` instead of a temperature.
    pub temp_sensor_fault: bool,
}

impl Reading {
    pub fn new(rpm: f64, temperature: f64, vibration: f64) -> Self {
        Self {
            rpm,
            temperature,
            vibration,
            temp_sensor_fault: false,
        }
    }

    /// Parse a single telemetry line.
    ///
    /// Returns `Ok(None)` when the line carries none of the known keys
    /// (blank lines, boot banners, debug output).
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        let mut reading = Reading::default();
        let mut matched = false;

        if let Some(raw) = segment(line, RPM_KEY) {
            reading.rpm = numeric_field("rpm", raw)?;
            matched = true;
        }

        if let Some(raw) = segment(line, TEMP_KEY) {
            if raw.contains(TEMP_ERROR_SENTINEL) {
                reading.temp_sensor_fault = true;
            } else {
                reading.temperature = numeric_field("temperature", raw.replace('C', "").trim())?;
            }
            matched = true;
        }

        if let Some(raw) = segment(line, VIB_KEY) {
            reading.vibration = numeric_field("vibration", raw.replace("m/s²", "").trim())?;
            matched = true;
        }

        Ok(matched.then_some(reading))
    }
}

/// Text following `key` up to the next `|`, trimmed.
fn segment<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (_, rest) = line.split_once(key)?;
    Some(rest.split('|').next().unwrap_or_default().trim())
}

/// Convert a field that should hold an unsigned decimal.
///
/// Anything that is not digits-and-dots reads as zero, matching how the
/// firmware pads or garbles values during start-up. Digits-and-dots that do
/// not form a number (`1.2.3`) are rejected.
fn numeric_field(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    let looks_numeric = {
        let mut digits = raw.chars().filter(|c| *c != '.').peekable();
        digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
    };

    if !looks_numeric {
        return Ok(0.0);
    }

    raw.parse().map_err(|_| ParseError::Malformed {
        field,
        value: raw.to_string(),
    })
}
