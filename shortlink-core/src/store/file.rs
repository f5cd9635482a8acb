//! File-backed URL store
//!
//! # Storage Format
//!
//! ```text
//! data/
//! └── urls.log     # Append-only event log (JSON lines, CRC32-prefixed)
//! ```
//!
//! Each line is `<crc32_hex>:<json_event>`. On open the log is replayed into
//! memory; lines failing the checksum or the JSON parse are skipped and
//! logged, so a torn final write only loses the event it carried.

use super::{CodeFor, Inserted, StoreResult, UrlRecord, UrlStore, UrlTable};
use chrono::{DateTime, Utc};
use crc32fast::Hasher as Crc32Hasher;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const LOG_FILE: &str = "urls.log";

/// Calculate CRC32 checksum for data
#[inline]
pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Format event line with CRC32 checksum prefix
/// Format: "<crc32_hex>:<json_data>"
#[inline]
pub fn format_event_with_crc32(event_json: &str) -> String {
    let crc = calculate_crc32(event_json.as_bytes());
    format!("{:08x}:{}", crc, event_json)
}

/// Parse event line and validate CRC32 checksum
/// Returns Ok(json_data) if valid, Err if corrupted or missing the prefix
pub fn parse_and_validate_event(line: &str) -> Result<&str, String> {
    if line.len() <= 9 || line.as_bytes()[8] != b':' {
        return Err("missing CRC32 prefix".to_string());
    }

    let (crc_hex, json_data) = (&line[..8], &line[9..]);
    let expected_crc = u32::from_str_radix(crc_hex, 16)
        .map_err(|_| format!("Invalid CRC32 hex: {}", crc_hex))?;
    let actual_crc = calculate_crc32(json_data.as_bytes());

    if expected_crc != actual_crc {
        return Err(format!(
            "CRC32 mismatch: expected {:08x}, got {:08x} - DATA CORRUPTED",
            expected_crc, actual_crc
        ));
    }

    Ok(json_data)
}

/// Events written to the URL log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum UrlEvent {
    Created {
        id: u64,
        original_url: String,
        short_code: String,
        created_at: DateTime<Utc>,
    },
    Clicked { short_code: String },
}

impl UrlEvent {
    fn apply(self, table: &mut UrlTable) {
        match self {
            UrlEvent::Created {
                id,
                original_url,
                short_code,
                created_at,
            } => {
                table.insert(UrlRecord {
                    id,
                    original_url,
                    short_code,
                    created_at,
                    click_count: 0,
                });
            }
            UrlEvent::Clicked { short_code } => {
                if table.increment_clicks(&short_code).is_none() {
                    log::warn!("Click event for unknown short code '{}' ignored", short_code);
                }
            }
        }
    }
}

/// Append target of the event log
trait LogFile: Write + Send {
    /// Cut the log back to `len` bytes
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;

    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

struct FileInner {
    table: UrlTable,
    log: Box<dyn LogFile>,
    /// Length of the log up to the last fully written event
    committed_len: u64,
    /// Set when a failed append could not be rolled back
    broken: bool,
}

/// URL store persisted as an append-only event log
pub struct FileUrlStore {
    log_path: PathBuf,
    fsync_on_append: bool,
    inner: Mutex<FileInner>,
}

impl FileUrlStore {
    /// Open (or create) the store under `base_path`, replaying any existing log
    pub fn open(base_path: impl AsRef<Path>, fsync_on_append: bool) -> StoreResult<Self> {
        let base_path = base_path.as_ref();
        fs::create_dir_all(base_path)?;
        let log_path = base_path.join(LOG_FILE);

        let (table, torn_tail) = Self::replay(&log_path)?;
        log::info!("Loaded {} URL records from {}", table.len(), log_path.display());

        let mut file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        if torn_tail {
            // Terminate the partial line so the next event starts clean
            file.write_all(b"\n")?;
        }

        let committed_len = file.metadata()?.len();

        Ok(Self {
            log_path,
            fsync_on_append,
            inner: Mutex::new(FileInner {
                table,
                log: Box::new(file),
                committed_len,
                broken: false,
            }),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Rebuild the table from the log, returning whether the log ends mid-line
    fn replay(log_path: &Path) -> StoreResult<(UrlTable, bool)> {
        let mut table = UrlTable::default();
        if !log_path.exists() {
            return Ok((table, false));
        }

        let bytes = fs::read(log_path)?;
        let content = String::from_utf8_lossy(&bytes);
        let mut skipped = 0usize;
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let event = parse_and_validate_event(line)
                .and_then(|json| serde_json::from_str::<UrlEvent>(json).map_err(|e| e.to_string()));
            match event {
                Ok(event) => event.apply(&mut table),
                Err(e) => {
                    skipped += 1;
                    log::warn!("Skipping line {} of {}: {}", line_no + 1, log_path.display(), e);
                }
            }
        }

        if skipped > 0 {
            log::warn!(
                "{} corrupted event(s) skipped while loading {}",
                skipped,
                log_path.display()
            );
        }
        let torn_tail = !bytes.is_empty() && !bytes.ends_with(b"\n");
        Ok((table, torn_tail))
    }

    /// Write one event line; on failure the log is cut back to its last good length
    fn append(&self, inner: &mut FileInner, event: &UrlEvent) -> StoreResult<()> {
        if inner.broken {
            return Err(io::Error::other(format!(
                "{} is in an unknown state after a failed write",
                self.log_path.display()
            ))
            .into());
        }

        let json = serde_json::to_string(event)?;
        let mut line = format_event_with_crc32(&json);
        line.push('\n');

        let fsync = self.fsync_on_append;
        let written = inner
            .log
            .write_all(line.as_bytes())
            .and_then(|()| if fsync { inner.log.sync() } else { Ok(()) });

        if let Err(e) = written {
            if let Err(rollback) = inner.log.truncate_to(inner.committed_len) {
                log::error!(
                    "Could not roll back {} to {} bytes: {}",
                    self.log_path.display(),
                    inner.committed_len,
                    rollback
                );
                inner.broken = true;
            }
            return Err(e.into());
        }

        inner.committed_len += line.len() as u64;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FileInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UrlStore for FileUrlStore {
    fn find_by_code(&self, code: &str) -> StoreResult<Option<UrlRecord>> {
        Ok(self.lock().table.find_by_code(code))
    }

    fn find_by_original(&self, original_url: &str) -> StoreResult<Option<UrlRecord>> {
        Ok(self.lock().table.find_by_original(original_url))
    }

    fn get_or_insert(&self, original_url: &str, code_for: &CodeFor) -> StoreResult<Inserted> {
        let mut inner = self.lock();
        if let Some(existing) = inner.table.find_by_original(original_url) {
            return Ok(Inserted::Existing(existing));
        }

        let record = inner.table.prepare(original_url, code_for)?;
        let event = UrlEvent::Created {
            id: record.id,
            original_url: record.original_url.clone(),
            short_code: record.short_code.clone(),
            created_at: record.created_at,
        };

        // Only index what reached the log
        self.append(&mut inner, &event)?;
        inner.table.insert(record.clone());
        Ok(Inserted::Created(record))
    }

    fn increment_clicks(&self, code: &str) -> StoreResult<Option<u64>> {
        let mut inner = self.lock();
        if !inner.table.has_code(code) {
            return Ok(None);
        }

        let event = UrlEvent::Clicked {
            short_code: code.to_string(),
        };
        self.append(&mut inner, &event)?;
        Ok(inner.table.increment_clicks(code))
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.lock().table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::code_for_id;
    use crate::store::StoreError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_crc32_line_roundtrip() {
        let line = format_event_with_crc32(r#"{"event":"clicked","short_code":"1"}"#);
        assert_eq!(parse_and_validate_event(&line), Ok(r#"{"event":"clicked","short_code":"1"}"#));
    }

    #[test]
    fn test_crc32_detects_tampering() {
        let line = format_event_with_crc32(r#"{"event":"clicked","short_code":"1"}"#);
        let tampered = line.replace("\"1\"", "\"2\"");
        let err = parse_and_validate_event(&tampered).unwrap_err();
        assert!(err.contains("CRC32 mismatch"));
        assert!(parse_and_validate_event("not a log line").is_err());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let code = {
            let store = FileUrlStore::open(dir.path(), false).unwrap();
            let record =
                store.get_or_insert("https://example.com", &code_for_id).unwrap().into_record();
            store.get_or_insert("https://example.org", &code_for_id).unwrap();
            store.increment_clicks(&record.short_code).unwrap();
            store.increment_clicks(&record.short_code).unwrap();
            record.short_code
        };

        let store = FileUrlStore::open(dir.path(), false).unwrap();
        let record = store.find_by_code(&code).unwrap().unwrap();
        assert_eq!(record.original_url, "https://example.com");
        assert_eq!(record.click_count, 2);
        assert_eq!(store.len().unwrap(), 2);

        // Ids keep increasing after replay
        let third = store.get_or_insert("https://example.net", &code_for_id).unwrap();
        assert_eq!(third.record().id, 3);
    }

    #[test]
    fn test_file_store_skips_corrupted_lines() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileUrlStore::open(dir.path(), true).unwrap();
            store.get_or_insert("https://example.com", &code_for_id).unwrap();
        }

        let log_path = dir.path().join(LOG_FILE);
        let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
        writeln!(file, "deadbeef:{{\"event\":\"clicked\",\"short_code\":\"1\"}}").unwrap();
        write!(file, "0000").unwrap(); // torn write

        let store = FileUrlStore::open(dir.path(), false).unwrap();
        let record = store.find_by_code("1").unwrap().unwrap();
        assert_eq!(record.click_count, 0);
        assert_eq!(store.len().unwrap(), 1);

        // Appends after the torn line are readable on the next open
        store.increment_clicks("1").unwrap();
        drop(store);
        let store = FileUrlStore::open(dir.path(), false).unwrap();
        assert_eq!(store.find_by_code("1").unwrap().unwrap().click_count, 1);
    }

    /// Log file that writes half of each buffer and then fails while armed
    struct FlakyLog {
        file: File,
        armed: Arc<AtomicBool>,
    }

    impl Write for FlakyLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.armed.load(Ordering::SeqCst) {
                self.file.write_all(&buf[..buf.len() / 2])?;
                return Err(io::Error::other("no space left on device"));
            }
            self.file.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl LogFile for FlakyLog {
        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.file.set_len(len)
        }

        fn sync(&mut self) -> io::Result<()> {
            self.file.sync_data()
        }
    }

    #[test]
    fn test_failed_append_is_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUrlStore::open(dir.path(), false).unwrap();
        store.get_or_insert("https://a.example", &code_for_id).unwrap();

        let armed = Arc::new(AtomicBool::new(true));
        {
            let file = OpenOptions::new().append(true).open(store.log_path()).unwrap();
            store.lock().log = Box::new(FlakyLog {
                file,
                armed: armed.clone(),
            });
        }

        assert!(store.get_or_insert("https://b.example", &code_for_id).is_err());
        assert!(store.find_by_original("https://b.example").unwrap().is_none());

        armed.store(false, Ordering::SeqCst);
        let c = store.get_or_insert("https://c.example", &code_for_id).unwrap();
        assert_eq!(c.record().id, 2);
        drop(store);

        // Nothing of the failed event reaches the replayed state
        let store = FileUrlStore::open(dir.path(), false).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert!(store.find_by_original("https://b.example").unwrap().is_none());
        let second = store.find_by_code("2").unwrap().unwrap();
        assert_eq!(second.original_url, "https://c.example");
    }

    #[test]
    fn test_unrecoverable_append_refuses_further_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUrlStore::open(dir.path(), false).unwrap();
        store.lock().broken = true;

        let err = store.get_or_insert("https://a.example", &code_for_id).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn test_file_store_unknown_code_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUrlStore::open(dir.path(), false).unwrap();

        assert_eq!(store.increment_clicks("zzz").unwrap(), None);
        assert_eq!(fs::read_to_string(store.log_path()).unwrap(), "");
    }
}
