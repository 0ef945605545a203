//! Lesson progress persistence.
//!
//! The [`ProgressStore`] trait is the contract sessions and front-ends use.
//! [`BlobProgressStore`] implements it over any [`StorageBackend`] by keeping
//! the whole [`AllProgress`] map in one JSON blob under [`STORAGE_KEY`].
//!
//! Storage is best-effort: an unreadable or corrupt blob reads as empty
//! progress, and failed writes are logged and dropped.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// Key under which the progress blob is stored.
pub const STORAGE_KEY: &str = "llearn-progress";

/// Completion state for one lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub completed: bool,
    /// When the lesson was last marked complete.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub last_attempt: Option<DateTime<Utc>>,
}

/// Reads an RFC 3339 timestamp, treating anything unparseable as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}

/// Lesson slug to progress, for one module.
pub type ModuleProgress = BTreeMap<String, LessonProgress>;

/// Module slug to module progress.
pub type AllProgress = BTreeMap<String, ModuleProgress>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read/write access to per-lesson completion.
///
/// Implementations never fail: reads fall back to defaults and writes are
/// best-effort.
pub trait ProgressStore {
    /// Stored progress for a lesson, or the default (not completed).
    ///
    /// Reading never creates an entry.
    fn lesson_progress(&self, module: &str, lesson: &str) -> LessonProgress;

    /// Mark a lesson complete and refresh its timestamp. Idempotent.
    fn mark_lesson_complete(&mut self, module: &str, lesson: &str);

    fn is_lesson_complete(&self, module: &str, lesson: &str) -> bool {
        self.lesson_progress(module, lesson).completed
    }

    /// Number of lessons recorded as complete for a module.
    fn completed_count(&self, module: &str) -> usize;

    /// Snapshot of everything stored.
    fn all_progress(&self) -> AllProgress;
}

/// A key/value text medium that progress is persisted to.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Source of "now" for progress timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Blob-backed store
// ---------------------------------------------------------------------------

/// Progress store that keeps all progress in one serialized blob.
pub struct BlobProgressStore<B, C = SystemClock> {
    backend: B,
    clock: C,
}

impl<B: StorageBackend> BlobProgressStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: SystemClock,
        }
    }
}

impl<B: StorageBackend, C: Clock> BlobProgressStore<B, C> {
    pub fn with_clock(backend: B, clock: C) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn load(&self) -> AllProgress {
        let raw = match self.backend.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return AllProgress::new(),
            Err(e) => {
                tracing::warn!("progress unavailable, starting empty: {e}");
                return AllProgress::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => parse_progress(value),
            Err(e) => {
                tracing::warn!("ignoring corrupt progress data: {e}");
                AllProgress::new()
            }
        }
    }

    fn save(&mut self, all: &AllProgress) {
        let json = match serde_json::to_string(all) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize progress: {e}");
                return;
            }
        };
        if let Err(e) = self.backend.write(STORAGE_KEY, &json) {
            tracing::warn!("failed to save progress: {e}");
        }
    }
}

/// Build progress from a parsed blob, dropping only the entries that do not
/// have the expected shape.
fn parse_progress(value: Value) -> AllProgress {
    let Value::Object(modules) = value else {
        tracing::warn!("ignoring progress data that is not an object");
        return AllProgress::new();
    };

    let mut all = AllProgress::new();
    for (module, lessons) in modules {
        let Value::Object(lessons) = lessons else {
            tracing::warn!("ignoring malformed progress for module {module}");
            continue;
        };
        let entry: &mut ModuleProgress = all.entry(module.clone()).or_default();
        for (lesson, record) in lessons {
            match serde_json::from_value::<LessonProgress>(record) {
                Ok(progress) => {
                    entry.insert(lesson, progress);
                }
                Err(e) => {
                    tracing::warn!("ignoring malformed progress for {module}/{lesson}: {e}");
                }
            }
        }
    }
    all
}

impl<B: StorageBackend, C: Clock> ProgressStore for BlobProgressStore<B, C> {
    fn lesson_progress(&self, module: &str, lesson: &str) -> LessonProgress {
        self.load()
            .get(module)
            .and_then(|m| m.get(lesson))
            .cloned()
            .unwrap_or_default()
    }

    fn mark_lesson_complete(&mut self, module: &str, lesson: &str) {
        let mut all = self.load();
        all.entry(module.to_string()).or_default().insert(
            lesson.to_string(),
            LessonProgress {
                completed: true,
                last_attempt: Some(self.clock.now()),
            },
        );
        self.save(&all);
        tracing::debug!("marked {module}/{lesson} complete");
    }

    fn completed_count(&self, module: &str) -> usize {
        self.load()
            .get(module)
            .map(|m| m.values().filter(|p| p.completed).count())
            .unwrap_or(0)
    }

    fn all_progress(&self) -> AllProgress {
        self.load()
    }
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// In-process storage. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, e.g. to simulate data written by another version.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Writes to a temporary file in the same directory, then renames it
    /// over the target so readers never see a partial blob.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let dir_error = |source| StorageError::Io {
            path: self.dir.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(dir_error)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(dir_error)?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| StorageError::Io {
                path: tmp.path().to_path_buf(),
                source,
            })?;
        tmp.persist(&path).map_err(|e| StorageError::Io {
            path,
            source: e.error,
        })?;
        Ok(())
    }
}

/// A medium that is never there. Every read and write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    /// Clock that advances one second per call.
    struct TickingClock(Cell<i64>);

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let secs = self.0.get();
            self.0.set(secs + 1);
            Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
        }
    }

    fn memory_store() -> BlobProgressStore<MemoryStorage, TickingClock> {
        BlobProgressStore::with_clock(MemoryStorage::new(), TickingClock(Cell::new(0)))
    }

    #[test]
    fn unknown_lesson_reads_default_without_writing() {
        let store = memory_store();
        let progress = store.lesson_progress("prompt-engineering", "clear-instructions");
        assert_eq!(progress, LessonProgress::default());
        assert!(!progress.completed);
        assert!(progress.last_attempt.is_none());
        assert!(store.backend().is_empty());
        assert!(store.all_progress().is_empty());
    }

    #[test]
    fn mark_complete_then_is_complete() {
        let mut store = memory_store();
        store.mark_lesson_complete("pe", "one");
        assert!(store.is_lesson_complete("pe", "one"));
        assert!(!store.is_lesson_complete("pe", "two"));
        assert!(!store.is_lesson_complete("other", "one"));
    }

    #[test]
    fn mark_complete_is_idempotent_and_refreshes_timestamp() {
        let mut store = memory_store();
        store.mark_lesson_complete("pe", "one");
        let first = store.lesson_progress("pe", "one").last_attempt.unwrap();

        store.mark_lesson_complete("pe", "one");
        let second = store.lesson_progress("pe", "one");
        assert!(second.completed);
        assert!(second.last_attempt.unwrap() > first);
        assert_eq!(store.completed_count("pe"), 1);
    }

    #[test]
    fn completed_count_per_module() {
        let mut store = memory_store();
        store.mark_lesson_complete("pe", "one");
        store.mark_lesson_complete("pe", "two");
        store.mark_lesson_complete("evals", "one");
        assert_eq!(store.completed_count("pe"), 2);
        assert_eq!(store.completed_count("evals"), 1);
        assert_eq!(store.completed_count("missing"), 0);
    }

    #[test]
    fn blob_layout_is_nested_json() {
        let mut store = memory_store();
        store.mark_lesson_complete("pe", "one");
        let raw = store.backend().get(STORAGE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["pe"]["one"]["completed"], serde_json::Value::Bool(true));
        assert!(value["pe"]["one"]["last_attempt"].is_string());
    }

    #[test]
    fn corrupt_blob_reads_empty_and_is_replaced_on_write() {
        let backend = MemoryStorage::new().with_entry(STORAGE_KEY, "{not json");
        let mut store = BlobProgressStore::new(backend);
        assert!(!store.is_lesson_complete("pe", "one"));
        assert!(store.all_progress().is_empty());

        store.mark_lesson_complete("pe", "one");
        assert!(store.is_lesson_complete("pe", "one"));
    }

    #[test]
    fn wrong_shape_blob_reads_empty() {
        let backend = MemoryStorage::new().with_entry(STORAGE_KEY, "[1, 2, 3]");
        let store = BlobProgressStore::new(backend);
        assert_eq!(store.completed_count("pe"), 0);
    }

    #[test]
    fn malformed_entry_does_not_erase_other_progress() {
        let blob = r#"{
            "pe": {
                "one": {"completed": true, "last_attempt": "2024-05-01T10:00:00Z"},
                "two": {"completed": true, "last_attempt": "yesterday"},
                "bad": {"completed": "yes"}
            },
            "evals": {"a": {"completed": true}},
            "junk": 7
        }"#;
        let backend = MemoryStorage::new().with_entry(STORAGE_KEY, blob);
        let mut store = BlobProgressStore::new(backend);

        assert!(store.is_lesson_complete("pe", "one"));
        assert!(store.lesson_progress("pe", "one").last_attempt.is_some());
        // An unreadable timestamp is dropped, not the whole record.
        let two = store.lesson_progress("pe", "two");
        assert!(two.completed);
        assert!(two.last_attempt.is_none());
        assert!(!store.is_lesson_complete("pe", "bad"));
        assert!(store.is_lesson_complete("evals", "a"));

        store.mark_lesson_complete("pe", "three");

        let stored: serde_json::Value =
            serde_json::from_str(store.backend().get(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored["pe"]["one"]["completed"], true);
        assert_eq!(stored["pe"]["two"]["completed"], true);
        assert_eq!(stored["pe"]["three"]["completed"], true);
        assert_eq!(stored["evals"]["a"]["completed"], true);
        assert!(stored["pe"].get("bad").is_none());
        assert_eq!(store.completed_count("pe"), 3);
    }

    #[test]
    fn blob_without_timestamps_loads() {
        let backend =
            MemoryStorage::new().with_entry(STORAGE_KEY, r#"{"pe":{"one":{"completed":true}}}"#);
        let store = BlobProgressStore::new(backend);
        let progress = store.lesson_progress("pe", "one");
        assert!(progress.completed);
        assert!(progress.last_attempt.is_none());
    }

    #[test]
    fn unavailable_storage_degrades_gracefully() {
        let mut store = BlobProgressStore::new(UnavailableStorage);
        assert!(!store.is_lesson_complete("pe", "one"));
        store.mark_lesson_complete("pe", "one");
        assert!(!store.is_lesson_complete("pe", "one"));
        assert!(store.all_progress().is_empty());
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let mut store = BlobProgressStore::new(FileStorage::new(&data_dir));
        assert!(!store.is_lesson_complete("pe", "one"));
        store.mark_lesson_complete("pe", "one");
        assert!(data_dir.join("llearn-progress.json").exists());

        let reopened = BlobProgressStore::new(FileStorage::new(&data_dir));
        assert!(reopened.is_lesson_complete("pe", "one"));
    }

    #[test]
    fn file_storage_replaces_blob_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());

        storage.write(STORAGE_KEY, r#"{"pe":{}}"#).unwrap();
        storage.write(STORAGE_KEY, r#"{"evals":{}}"#).unwrap();

        assert_eq!(
            storage.read(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"evals":{}}"#)
        );
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn file_storage_write_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();

        let mut store = BlobProgressStore::new(FileStorage::new(&blocker));
        store.mark_lesson_complete("pe", "one");
        assert!(!store.is_lesson_complete("pe", "one"));
    }
}
