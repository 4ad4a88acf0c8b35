//! Channel-based data source.
//!
//! Receives readings pushed through a tokio mpsc channel. Useful when the
//! readings come from another part of the same process, such as a custom
//! transport or a test harness.

use tokio::sync::mpsc;

use super::{DataSource, Reading};

/// A data source fed by an in-process channel.
///
/// ```
/// use enginewatch::{ChannelSource, DataSource, Reading};
///
/// let (tx, mut source) = ChannelSource::create("bench rig", 16);
/// tx.try_send(Reading::new(2200.0, 80.0, 1.2)).unwrap();
/// assert_eq!(source.poll().unwrap().rpm, 2200.0);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<Reading>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    pub fn new(receiver: mpsc::Receiver<Reading>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a sender/source pair with the given buffer size.
    pub fn create(source_description: &str, capacity: usize) -> (mpsc::Sender<Reading>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Reading> {
        match self.receiver.try_recv() {
            Ok(reading) => Some(reading),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        None
    }

    fn is_exhausted(&self) -> bool {
        self.closed
    }
}
