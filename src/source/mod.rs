//! Data source abstraction for receiving engine telemetry.
//!
//! This module provides a trait-based abstraction over where readings come
//! from: a serial-attached microcontroller, a replayed capture file, a
//! synthetic generator, or an in-process channel.

mod channel;
mod reading;
pub mod serial;
mod simulated;
mod stream;

pub use channel::ChannelSource;
pub use reading::Reading;
pub use simulated::SimulatedSource;
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for receiving readings from various sources.
///
/// # Example
///
/// ```
/// use enginewatch::{DataSource, SimulatedSource};
///
/// let mut source = SimulatedSource::seeded(42);
/// if let Some(reading) = source.poll() {
///     println!("rpm = {}", reading.rpm);
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next reading.
    ///
    /// Returns `Some(reading)` if one is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<Reading>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The last error the source ran into, if any.
    fn error(&self) -> Option<String>;

    /// Whether the source can never produce another reading.
    ///
    /// A closed serial connection or a fully replayed file is exhausted.
    fn is_exhausted(&self) -> bool {
        false
    }
}
