//! Stream-based data source.
//!
//! Receives feed updates from an async byte stream, such as a TCP
//! connection to a fetcher process.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{DataSource, FeedUpdate};

/// A data source that receives feed updates from an async stream.
///
/// A background task reads newline-delimited JSON from the reader and makes
/// each decoded update available via `poll()`. When several updates queue
/// up between polls only the newest is returned.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use blockpulse::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<FeedUpdate>,
    description: String,
    shared_error: Arc<Mutex<Option<String>>>,
    /// Copy of `shared_error` taken on the last poll, so `error()` can
    /// hand out a plain reference.
    last_error: Option<String>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Each line is parsed as a complete `FeedUpdate`. Lines that fail to
    /// parse, including ones that are not valid UTF-8, are skipped and
    /// reported through `error()`.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = Vec::new();

            loop {
                line.clear();
                // Bytes, not `read_line`: invalid UTF-8 must not end the stream
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => {
                        debug!("feed stream reached EOF");
                        *error_handle.lock() = Some("Connection closed".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim_ascii();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_slice::<FeedUpdate>(trimmed) {
                            Ok(update) => {
                                *error_handle.lock() = None;
                                if tx.send(update).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("skipping malformed feed update: {}", e);
                                *error_handle.lock() = Some(format!("Parse error: {}", e));
                            }
                        }
                    }
                    Err(e) => {
                        *error_handle.lock() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            shared_error,
            last_error: None,
        }
    }

    /// Create a `StreamSource` fed by a channel of raw JSON messages.
    ///
    /// Useful when the bytes come from a message bus client rather than an
    /// `AsyncRead`.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, update_rx) = mpsc::channel(16);
        let shared_error = Arc::new(Mutex::new(None));
        let error_handle = shared_error.clone();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match serde_json::from_slice::<FeedUpdate>(&bytes) {
                    Ok(update) => {
                        *error_handle.lock() = None;
                        if tx.send(update).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("skipping malformed feed update: {}", e);
                        *error_handle.lock() = Some(format!("Parse error: {}", e));
                    }
                }
            }
        });

        Self {
            receiver: update_rx,
            description: format!("stream: {}", description),
            shared_error,
            last_error: None,
        }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<FeedUpdate> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(update) => latest = Some(update),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    let mut shared = self.shared_error.lock();
                    if shared.is_none() {
                        *shared = Some("Stream disconnected".to_string());
                    }
                    break;
                }
            }
        }

        self.last_error = self.shared_error.lock().clone();
        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn sample_json(number: u64) -> String {
        format!(
            r#"{{"latestBlockFees":[{{"number":{},"minedAt":"2024-01-01T00:00:00Z","fees":1000}}],"blockLag":0}}"#,
            number
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_stream_source_spawn() {
        let cursor = Cursor::new(format!("{}\n", sample_json(7)));
        let mut source = StreamSource::spawn(cursor, "test");

        settle().await;

        let update = source.poll().unwrap();
        assert_eq!(update.snapshot().newest().unwrap().number, 7);
    }

    #[tokio::test]
    async fn test_stream_source_returns_newest_of_queued_updates() {
        let data = format!("{}\n{}\n{}\n", sample_json(1), sample_json(2), sample_json(3));
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        let update = source.poll().unwrap();
        assert_eq!(update.snapshot().newest().unwrap().number, 3);
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_description() {
        let source = StreamSource::spawn(Cursor::new(""), "tcp://localhost:9090");
        assert_eq!(source.description(), "stream: tcp://localhost:9090");
    }

    #[tokio::test]
    async fn test_stream_source_from_bytes_channel() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(sample_json(42).into_bytes()).await.unwrap();
        settle().await;

        let update = source.poll().unwrap();
        assert_eq!(update.snapshot().newest().unwrap().number, 42);
        assert!(source.error().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_invalid_json_reports_error() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let mut source = StreamSource::from_bytes_channel(rx, "test-channel");

        tx.send(b"not valid json".to_vec()).await.unwrap();
        settle().await;

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[tokio::test]
    async fn test_stream_source_skips_invalid_utf8_line() {
        let mut data = b"\xff\xfe{\n".to_vec();
        data.extend_from_slice(format!("{}\n", sample_json(5)).as_bytes());
        let mut source = StreamSource::spawn(Cursor::new(data), "test");

        settle().await;

        let update = source.poll().unwrap();
        assert_eq!(update.snapshot().newest().unwrap().number, 5);
    }

    #[tokio::test]
    async fn test_stream_source_invalid_utf8_reports_parse_error() {
        use tokio::io::AsyncWriteExt;

        let (mut writer, reader) = tokio::io::duplex(256);
        let mut source = StreamSource::spawn(reader, "test");

        writer.write_all(b"\xff\xfe\n").await.unwrap();
        settle().await;

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));

        // The reader is still alive
        writer.write_all(format!("{}\n", sample_json(6)).as_bytes()).await.unwrap();
        settle().await;
        assert_eq!(source.poll().unwrap().snapshot().newest().unwrap().number, 6);
        assert!(source.error().is_none());
    }

    #[tokio::test]
    async fn test_stream_source_reports_closed_connection() {
        let mut source = StreamSource::spawn(Cursor::new(""), "test");

        settle().await;

        assert!(source.poll().is_none());
        assert!(source.error().is_some());
    }
}
