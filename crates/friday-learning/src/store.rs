//! Write-through learning store backed by a JSON file.
//!
//! Every mutation runs load-modify-persist under one async lock, so writes
//! from a single store never interleave. Persistence failures are logged and
//! the in-memory record keeps serving reads; the next mutation rewrites the
//! whole record.
//!
//! Queries read a published snapshot and never wait for a write in flight.
//! If the file exists but cannot be read, writes are held back until a later
//! read succeeds so the unread file is never overwritten.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use friday_core::config::LearningConfig;
use friday_core::types::{Action, ConfidenceScore, Intent, Timestamp};

use crate::error::LearningError;
use crate::record::{CustomCommand, InteractionRecord, LearningRecord, Preference};

/// Record guarded by the write lock.
#[derive(Debug, Default)]
struct Writer {
    record: LearningRecord,
    /// A load has been attempted.
    loaded: bool,
    /// The record reflects the file on disk and may be written back.
    synced: bool,
}

pub struct LearningStore {
    path: PathBuf,
    history_limit: usize,
    writer: Mutex<Writer>,
    snapshot: RwLock<Arc<LearningRecord>>,
    ready: AtomicBool,
}

impl LearningStore {
    /// Create a store for `path`. Nothing is read until first access.
    pub fn new(path: impl Into<PathBuf>, settings: &LearningConfig) -> Self {
        Self {
            path: path.into(),
            history_limit: settings.interaction_history_limit,
            writer: Mutex::new(Writer::default()),
            snapshot: RwLock::new(Arc::new(LearningRecord::default())),
            ready: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current record, reading it from disk on first access.
    ///
    /// A missing file is initialized with an empty record and written
    /// immediately.
    pub async fn load(&self) -> LearningRecord {
        self.current().await.as_ref().clone()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append an example utterance for `intent`.
    pub async fn record_example(&self, intent: Intent, text: &str) {
        self.mutate(|record| {
            record
                .learned_patterns
                .entry(intent.as_str().to_string())
                .or_default()
                .examples
                .push(text.to_string());
        })
        .await;
    }

    /// Store a named command. Returns `false`, writing nothing, when the
    /// name is blank or there are no actions.
    ///
    /// Names are stored trimmed and lowercased.
    pub async fn create_custom_command(&self, name: &str, actions: Vec<Action>) -> bool {
        let key = match validate_command(name, &actions) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "Rejected custom command");
                return false;
            }
        };

        let count = actions.len();
        let created = chrono::Utc::now();
        self.mutate(|record| {
            record
                .custom_commands
                .insert(key.clone(), CustomCommand { actions, created });
        })
        .await;
        info!(name = %key, actions = count, "Custom command created");
        true
    }

    /// Upsert a preference and bump its frequency.
    pub async fn update_preference(&self, key: &str, value: serde_json::Value) {
        let now = chrono::Utc::now();
        self.mutate(|record| {
            record
                .user_preferences
                .entry(key.to_string())
                .and_modify(|pref| {
                    pref.value = value.clone();
                    pref.last_updated = now;
                    pref.frequency += 1;
                })
                .or_insert_with(|| Preference {
                    value: value.clone(),
                    last_updated: now,
                    frequency: 1,
                });
        })
        .await;
    }

    /// Append to the interaction history, dropping the oldest entries past
    /// the configured limit.
    pub async fn record_interaction(&self, text: &str, intent: Intent, confidence: ConfidenceScore) {
        let limit = self.history_limit;
        self.mutate(|record| {
            record.interaction_history.push(InteractionRecord {
                text: text.to_string(),
                intent,
                confidence,
                timestamp: chrono::Utc::now(),
            });
            record.trim_history(limit);
        })
        .await;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn custom_command(&self, name: &str) -> Option<CustomCommand> {
        let key = normalize_name(name);
        self.current().await.custom_commands.get(&key).cloned()
    }

    pub async fn examples_for(&self, intent: Intent) -> Vec<String> {
        self.current().await.examples_for(intent).to_vec()
    }

    pub async fn preference(&self, key: &str) -> Option<Preference> {
        self.current().await.user_preferences.get(key).cloned()
    }

    pub async fn last_updated(&self) -> Timestamp {
        self.current().await.last_updated
    }

    /// Write the current record to disk, returning any failure.
    ///
    /// Fails without writing while the existing file is unreadable.
    pub async fn persist(&self) -> Result<(), LearningError> {
        let writer = self.writer().await;
        if !writer.synced {
            return Err(unread_error(&self.path));
        }
        write_record(&self.path, &writer.record).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Latest published record. Only the first call may wait on the write
    /// lock, to perform the initial load.
    async fn current(&self) -> Arc<LearningRecord> {
        if !self.ready.load(Ordering::Acquire) {
            drop(self.writer().await);
        }
        Arc::clone(&self.snapshot.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn publish(&self, record: &LearningRecord) {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(record.clone());
        self.ready.store(true, Ordering::Release);
    }

    /// Lock the writer, loading or re-reading the file when needed.
    async fn writer(&self) -> MutexGuard<'_, Writer> {
        let mut writer = self.writer.lock().await;
        if !writer.loaded {
            match read_or_init(&self.path).await {
                Ok(record) => {
                    writer.record = record;
                    writer.synced = true;
                }
                Err(e) => {
                    error!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to read learning record; holding back writes"
                    );
                }
            }
            writer.loaded = true;
            self.publish(&writer.record);
        } else if !writer.synced {
            self.resync(&mut writer).await;
        }
        writer
    }

    /// Retry reading a file that was unreadable, folding in everything
    /// learned meanwhile.
    async fn resync(&self, writer: &mut Writer) {
        let disk = match read_record(&self.path).await {
            Ok(Some(disk)) => disk,
            Ok(None) => LearningRecord::default(),
            Err(e @ LearningError::Serialization(_)) => {
                error!(path = %self.path.display(), error = %e, "Learning record is corrupt; starting over");
                LearningRecord::default()
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Learning record still unreadable");
                return;
            }
        };
        let pending = std::mem::replace(&mut writer.record, disk);
        writer.record.absorb(pending);
        writer.record.trim_history(self.history_limit);
        writer.synced = true;
        info!(path = %self.path.display(), "Learning record readable again");
        self.publish(&writer.record);
    }

    async fn mutate<F>(&self, apply: F)
    where
        F: FnOnce(&mut LearningRecord),
    {
        let mut writer = self.writer().await;
        apply(&mut writer.record);
        writer.record.touch();
        self.publish(&writer.record);

        if !writer.synced {
            error!(path = %self.path.display(), "Learning record unreadable; change kept in memory only");
            return;
        }
        if let Err(e) = write_record(&self.path, &writer.record).await {
            error!(path = %self.path.display(), error = %e, "Failed to persist learning record");
        }
    }
}

fn unread_error(path: &Path) -> LearningError {
    LearningError::Io(std::io::Error::other(format!(
        "{} exists but could not be read; refusing to overwrite it",
        path.display()
    )))
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_command(name: &str, actions: &[Action]) -> Result<String, LearningError> {
    let key = normalize_name(name);
    if key.is_empty() {
        return Err(LearningError::InvalidCommand("name is empty".to_string()));
    }
    if actions.is_empty() {
        return Err(LearningError::InvalidCommand(format!("'{key}' has no actions")));
    }
    if actions.iter().any(|a| a.name.trim().is_empty()) {
        return Err(LearningError::InvalidCommand(format!(
            "'{key}' has an action without a name"
        )));
    }
    Ok(key)
}

/// Read the record, creating it when absent or corrupt.
///
/// Any other read failure is returned so the caller does not overwrite a
/// file it could not read.
async fn read_or_init(path: &Path) -> Result<LearningRecord, LearningError> {
    match read_record(path).await {
        Ok(Some(record)) => {
            debug!(path = %path.display(), "Loaded learning record");
            Ok(record)
        }
        Ok(None) => {
            info!(path = %path.display(), "No learning record found; creating a new one");
            Ok(init_default(path).await)
        }
        Err(e @ LearningError::Serialization(_)) => {
            error!(path = %path.display(), error = %e, "Learning record is corrupt; starting over");
            Ok(init_default(path).await)
        }
        Err(e) => Err(e),
    }
}

async fn init_default(path: &Path) -> LearningRecord {
    let record = LearningRecord::default();
    if let Err(e) = write_record(path, &record).await {
        error!(path = %path.display(), error = %e, "Failed to initialize learning record");
    }
    record
}

/// `Ok(None)` when the file does not exist.
async fn read_record(path: &Path) -> Result<Option<LearningRecord>, LearningError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write to a sibling temp file, then rename it over the target.
async fn write_record(path: &Path, record: &LearningRecord) -> Result<(), LearningError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(record)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store_in(dir: &Path) -> LearningStore {
        LearningStore::new(dir.join("learning.json"), &LearningConfig::default())
    }

    async fn on_disk(path: &Path) -> LearningRecord {
        let content = tokio::fs::read_to_string(path).await.unwrap();
        serde_json::from_str(&content).unwrap()
    }

    // ---- Load ----

    #[tokio::test]
    async fn test_load_creates_file_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(!store.path().exists());

        let record = store.load().await;
        assert!(record.custom_commands.is_empty());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_new_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(!store.path().exists());
        drop(store);
        assert!(!dir.path().join("learning.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = LearningStore::new(&path, &LearningConfig::default());
        let record = store.load().await;
        assert!(record.learned_patterns.is_empty());
        // File now holds a valid record.
        on_disk(&path).await;
    }

    #[tokio::test]
    async fn test_load_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("friday").join("learning.json");
        let store = LearningStore::new(&path, &LearningConfig::default());
        store.load().await;
        assert!(path.exists());
    }

    // ---- Examples ----

    #[tokio::test]
    async fn test_record_example_appends_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.record_example(Intent::Search, "find rust tutorials").await;
        store.record_example(Intent::Search, "search the weather").await;

        assert_eq!(
            store.examples_for(Intent::Search).await,
            vec!["find rust tutorials", "search the weather"]
        );
        let disk = on_disk(store.path()).await;
        assert_eq!(disk.examples_for(Intent::Search).len(), 2);
    }

    // ---- Custom commands ----

    #[tokio::test]
    async fn test_create_custom_command_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(!store.create_custom_command("", vec![Action::new("open_app")]).await);
        assert!(!store.create_custom_command("   ", vec![Action::new("open_app")]).await);
        // Rejection never touches disk.
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_create_custom_command_rejects_empty_actions() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.load().await;
        let before = tokio::fs::read_to_string(store.path()).await.unwrap();

        assert!(!store.create_custom_command("morning_routine", vec![]).await);

        let after = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(before, after);
        assert!(store.custom_command("morning_routine").await.is_none());
    }

    #[tokio::test]
    async fn test_create_custom_command_stores_actions() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let actions = vec![
            Action::new("open_app").with_parameter("app", serde_json::json!("Mail")),
            Action::new("read_news"),
        ];
        assert!(store.create_custom_command("Morning Routine ", actions.clone()).await);

        let cmd = store.custom_command("morning routine").await.unwrap();
        assert_eq!(cmd.actions, actions);
        assert!(on_disk(store.path()).await.custom_commands.contains_key("morning routine"));
    }

    #[test]
    fn test_validate_command_rejects_unnamed_action() {
        let err = validate_command("bedtime", &[Action::new(" ")]).unwrap_err();
        assert!(matches!(err, LearningError::InvalidCommand(_)));
    }

    // ---- Preferences ----

    #[tokio::test]
    async fn test_update_preference_upserts_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.update_preference("last_app", serde_json::json!("terminal")).await;
        store.update_preference("last_app", serde_json::json!("browser")).await;

        let pref = store.preference("last_app").await.unwrap();
        assert_eq!(pref.value, serde_json::json!("browser"));
        assert_eq!(pref.frequency, 2);
    }

    // ---- Interactions ----

    #[tokio::test]
    async fn test_record_interaction_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LearningConfig {
            interaction_history_limit: 3,
            ..LearningConfig::default()
        };
        let store = LearningStore::new(dir.path().join("learning.json"), &settings);
        for i in 0..5 {
            store
                .record_interaction(&format!("utterance {i}"), Intent::Search, ConfidenceScore::new(0.8))
                .await;
        }
        let record = store.load().await;
        let texts: Vec<_> = record.interaction_history.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["utterance 2", "utterance 3", "utterance 4"]);
    }

    // ---- last_updated ----

    #[tokio::test]
    async fn test_mutation_refreshes_last_updated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let before = store.load().await.last_updated;
        store.record_example(Intent::Email, "email mom").await;
        let after = store.last_updated().await;
        assert!(after >= before);
    }

    // ---- Failure handling ----

    #[tokio::test]
    async fn test_persist_failure_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        // Parent "directory" is a regular file, so every write fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let store = LearningStore::new(blocker.join("learning.json"), &LearningConfig::default());

        store.record_example(Intent::Settings, "set volume to 5").await;
        assert_eq!(store.examples_for(Intent::Settings).await, vec!["set volume to 5"]);
        assert!(store.persist().await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        let mut bytes = br#"{"custom_commands":{"morning":{"actions":[{"name":"open_calendar"}],"created":"2024-03-01T08:00:00Z"}},"last_updated":"2024-03-01T08:00:00Z"}"#.to_vec();
        bytes.push(0xFF);
        std::fs::write(&path, &bytes).unwrap();

        let store = LearningStore::new(&path, &LearningConfig::default());
        store.update_preference("last_app", serde_json::json!("terminal")).await;

        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        assert!(store.persist().await.is_err());
        // The change is still served from memory.
        assert!(store.preference("last_app").await.is_some());
    }

    #[tokio::test]
    async fn test_unreadable_file_is_merged_once_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        let good = r#"{"custom_commands":{"morning":{"actions":[{"name":"open_calendar"}],"created":"2024-03-01T08:00:00Z"}},"last_updated":"2024-03-01T08:00:00Z"}"#;
        let mut bytes = good.as_bytes().to_vec();
        bytes.push(0xFF);
        std::fs::write(&path, &bytes).unwrap();

        let store = LearningStore::new(&path, &LearningConfig::default());
        store.record_example(Intent::Search, "find cats").await;

        std::fs::write(&path, good).unwrap();
        store.record_example(Intent::Search, "find dogs").await;

        let disk = on_disk(&path).await;
        assert!(disk.custom_commands.contains_key("morning"));
        assert_eq!(disk.examples_for(Intent::Search), ["find cats", "find dogs"]);
        assert!(store.custom_command("morning").await.is_some());
    }

    // ---- Snapshot reads ----

    #[tokio::test]
    async fn test_queries_do_not_wait_for_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.create_custom_command("bedtime", vec![Action::new("lock_screen")]).await);

        // Simulate a write in flight.
        let _writing = store.writer.lock().await;
        let found = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            store.custom_command("bedtime"),
        )
        .await
        .expect("query waited on the write lock");
        assert!(found.is_some());
    }

    // ---- Concurrency ----

    #[tokio::test]
    async fn test_concurrent_writes_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(dir.path()));
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record_example(Intent::GeneralCommand, &format!("example {i}")).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let disk = on_disk(store.path()).await;
        assert_eq!(disk.examples_for(Intent::GeneralCommand).len(), 20);
    }
}
