//! File-based data source.
//!
//! Polls a JSON file holding the latest feed update.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use super::{DataSource, FeedUpdate};

/// A data source that reads feed updates from a JSON file.
///
/// An external fetcher overwrites the file; this source tracks its
/// modification time and only returns data when the file has changed.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<FeedUpdate> {
        let result = fs::read_to_string(&self.path)
            .map_err(|e| format!("Read error: {}", e))
            .and_then(|content| {
                serde_json::from_str(&content).map_err(|e| format!("Parse error: {}", e))
            });

        match result {
            Ok(update) => {
                self.last_error = None;
                Some(update)
            }
            Err(err) => {
                if self.last_error.as_deref() != Some(err.as_str()) {
                    warn!(path = %self.path.display(), "{}", err);
                }
                self.last_error = Some(err);
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<FeedUpdate> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep what we have
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(update) = self.read_file() {
                self.last_modified = current_modified;
                return Some(update);
            }
        }

        None
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
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "latestBlockFees": [
                { "number": 100, "minedAt": "2024-01-01T00:00:12Z", "baseFeePerGas": 9000000000 },
                { "number": 99, "minedAt": "2024-01-01T00:00:00Z" }
            ],
            "blockLag": 1
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/feed.json");
        assert_eq!(source.path(), Path::new("/tmp/feed.json"));
        assert_eq!(source.description(), "file: /tmp/feed.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let update = source.poll().unwrap();
        assert_eq!(update.snapshot().newest().unwrap().number, 100);
        assert_eq!(update.block_lag, Some(1));

        // Second poll without file change should return None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_some());
        let first_modified = file.as_file().metadata().unwrap().modified().unwrap();

        file.as_file().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(
            file,
            r#"{{ "latestBlockFees": [ {{ "number": 101, "minedAt": "2024-01-01T00:00:24Z" }} ] }}"#
        )
        .unwrap();
        file.flush().unwrap();

        // Pin the mtime so coarse filesystem timestamps cannot hide the change
        file.as_file()
            .set_modified(first_modified + std::time::Duration::from_secs(5))
            .unwrap();

        let update = source.poll().unwrap();
        assert_eq!(update.snapshot().newest().unwrap().number, 101);
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/feed.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
