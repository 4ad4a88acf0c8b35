//! Stream-based data source.
//!
//! Receives telemetry lines from an async byte stream. The serial port and
//! replayed capture files both go through here.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::{DataSource, Reading};
use crate::error::SourceError;

/// Readings buffered between the reader task and the polling loop.
const CHANNEL_CAPACITY: usize = 64;

/// A data source that parses telemetry lines from an async reader.
///
/// A background task reads newline-delimited telemetry and hands parsed
/// readings to `poll()`. Lines that fail to parse are skipped and recorded
/// as the source's last error.
///
/// ```
/// use std::io::Cursor;
/// use enginewatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"RPM: 2400 | Temp: 80C | Vib: 1.5m/s\xc2\xb2\n";
/// let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<Reading>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
    exhausted: bool,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => {
                        tracing::debug!(source = %desc, "stream reached end of input");
                        break;
                    }
                    Ok(_) => {
                        let line = match std::str::from_utf8(&buf) {
                            Ok(line) => line,
                            Err(e) => {
                                set_error(&error_handle, format!("Parse error: {}", e));
                                continue;
                            }
                        };
                        match Reading::parse_line(line) {
                            Ok(Some(reading)) => {
                                if tx.send(reading).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Ok(None) => {
                                tracing::trace!(line = %line.trim(), "ignoring non-telemetry line");
                            }
                            Err(e) => {
                                set_error(&error_handle, format!("Parse error: {}", e));
                            }
                        }
                    }
                    Err(e) => {
                        set_error(&error_handle, format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
            exhausted: false,
        }
    }

    /// Replay a captured telemetry log, one line per reading.
    pub async fn replay_file(path: &Path) -> Result<Self, SourceError> {
        let file = tokio::fs::File::open(path).await?;
        let mut source = Self::spawn(file, &path.display().to_string());
        source.description = format!("replay: {}", path.display());
        Ok(source)
    }
}

fn set_error(handle: &Mutex<Option<String>>, message: String) {
    tracing::warn!("{}", message);
    if let Ok(mut slot) = handle.lock() {
        *slot = Some(message);
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<Reading> {
        match self.receiver.try_recv() {
            Ok(reading) => Some(reading),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.exhausted = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|slot| slot.clone())
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const LINE: &str = "RPM: 2450 | Temp: 86.5C | Vib: 2.3m/s²";

    async fn settle() {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let data = format!("{}\n", LINE);
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        let reading = source.poll().unwrap();
        assert_eq!(reading.rpm, 2450.0);
        assert_eq!(reading.temperature, 86.5);
    }

    #[tokio::test]
    async fn test_stream_source_multiple_readings() {
        let data = format!("{}\n{}\n", LINE, "RPM: 1000 | Temp: 70C | Vib: 1.0m/s²");
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        assert_eq!(source.poll().unwrap().rpm, 2450.0);
        assert_eq!(source.poll().unwrap().rpm, 1000.0);
        assert!(source.poll().is_none());
        assert!(source.is_exhausted());
    }

    #[tokio::test]
    async fn test_stream_source_skips_noise_and_records_errors() {
        let data = format!("booting...\nRPM: 1.2.3\n{}\n", LINE);
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        assert_eq!(source.poll().unwrap().rpm, 2450.0);
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[tokio::test]
    async fn test_stream_source_rejects_invalid_utf8() {
        let mut data = b"RPM: 2\xff00 | Temp: 80C | Vib: 1.0m/s\xc2\xb2\n".to_vec();
        data.extend_from_slice(format!("{}\n", LINE).as_bytes());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        // The corrupted line is skipped rather than read as zero RPM
        assert_eq!(source.poll().unwrap().rpm, 2450.0);
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "/dev/ttyUSB0");
        assert_eq!(source.description(), "stream: /dev/ttyUSB0");
    }

    #[tokio::test]
    async fn test_stream_source_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", LINE).unwrap();
        file.flush().unwrap();

        let mut source = StreamSource::replay_file(file.path()).await.unwrap();
        assert!(source.description().starts_with("replay: "));

        settle().await;
        assert_eq!(source.poll().unwrap().vibration, 2.3);
    }

    #[tokio::test]
    async fn test_stream_source_replay_missing_file() {
        let result = StreamSource::replay_file(Path::new("/nonexistent/capture.log")).await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
