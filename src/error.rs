//! Error types for the monitor library.

use thiserror::Error;

/// Errors produced while parsing a telemetry line.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// A field looked numeric but could not be converted.
    #[error("Malformed {field} value: {value:?}")]
    Malformed { field: &'static str, value: String },
}

/// Errors raised by data sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No serial ports were detected on this machine.
    #[error("No serial ports detected")]
    NoPorts,

    /// The serial port could not be opened.
    #[error("Failed to open serial port {port}: {reason}")]
    Open { port: String, reason: String },

    /// Failed to enumerate serial ports.
    #[error("Failed to list serial ports: {0}")]
    List(String),

    /// I/O failure while reading or opening a source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when delivering an alert.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Alerts are enabled but the bot token or chat id is missing.
    #[error("Telegram is not configured: {0}")]
    NotConfigured(&'static str),

    /// The Bot API answered with a non-success status.
    #[error("Telegram API returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Any other HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for AlertError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AlertError::Timeout
        } else if err.is_connect() {
            AlertError::Connection(err.to_string())
        } else {
            AlertError::Http(err.to_string())
        }
    }
}

/// Errors that can occur while exporting the sample table.
#[derive(Debug, Error)]
pub enum ReportError {
    /// There is nothing to export yet.
    #[error("No samples to export")]
    Empty,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
