//! Serial port discovery and connection.
//!
//! The port is opened when a monitoring run starts and read by a
//! [`StreamSource`] task. There is no reconnect policy: if the board is
//! unplugged the stream ends and the run stops.

use std::time::Duration;

use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt};

use super::StreamSource;
use crate::error::SourceError;

/// Port name fragments that usually identify a microcontroller board.
const PREFERRED_PORT_HINTS: &[&str] = &["COM3", "COM4", "ttyUSB", "ttyACM"];

/// Serial connection parameters.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout on the underlying port.
    pub timeout: Duration,
    /// Time to wait after opening, while the board resets.
    pub settle: Duration,
}

impl SerialSettings {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            timeout: Duration::from_secs(1),
            settle: Duration::from_secs(2),
        }
    }
}

/// List the serial ports visible on this machine.
pub fn list_ports() -> Result<Vec<String>, SourceError> {
    let ports =
        tokio_serial::available_ports().map_err(|e| SourceError::List(e.to_string()))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Pick the port most likely to be the sensor board.
///
/// Prefers `current` when it is still present, then the first port whose
/// name matches a common board pattern, then the first port.
pub fn default_port<'a>(ports: &'a [String], current: Option<&str>) -> Option<&'a str> {
    if let Some(current) = current {
        if let Some(port) = ports.iter().find(|p| p.as_str() == current) {
            return Some(port.as_str());
        }
    }

    ports
        .iter()
        .find(|p| PREFERRED_PORT_HINTS.iter().any(|hint| p.contains(hint)))
        .or_else(|| ports.first())
        .map(String::as_str)
}

/// Open the serial port and start streaming readings from it.
pub async fn open(settings: &SerialSettings) -> Result<StreamSource, SourceError> {
    let open_error = |reason: String| SourceError::Open {
        port: settings.port.clone(),
        reason,
    };

    let stream = tokio_serial::new(&settings.port, settings.baud_rate)
        .timeout(settings.timeout)
        .open_native_async()
        .map_err(|e| open_error(e.to_string()))?;

    tracing::info!(
        port = %settings.port,
        baud = settings.baud_rate,
        "serial port opened, waiting for board reset"
    );
    tokio::time::sleep(settings.settle).await;

    stream.clear(ClearBuffer::Input).map_err(|e| open_error(e.to_string()))?;

    Ok(StreamSource::spawn(stream, &settings.port))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_port_prefers_board_names() {
        let available = ports(&["/dev/ttyS0", "/dev/ttyUSB0", "/dev/ttyACM0"]);
        assert_eq!(default_port(&available, None), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn test_default_port_keeps_current_connection() {
        let available = ports(&["COM1", "COM3", "COM7"]);
        assert_eq!(default_port(&available, Some("COM7")), Some("COM7"));
        assert_eq!(default_port(&available, Some("COM9")), Some("COM3"));
    }

    #[test]
    fn test_default_port_falls_back_to_first() {
        let available = ports(&["/dev/ttyS0", "/dev/ttyS1"]);
        assert_eq!(default_port(&available, None), Some("/dev/ttyS0"));
        assert_eq!(default_port(&[], None), None);
    }

    #[test]
    fn test_serial_settings_defaults() {
        let settings = SerialSettings::new("/dev/ttyUSB0", 9600);
        assert_eq!(settings.timeout, Duration::from_secs(1));
        assert_eq!(settings.settle, Duration::from_secs(2));
    }
}
