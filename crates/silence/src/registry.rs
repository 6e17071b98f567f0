//! Durable set of silenced topics.
//!
//! The file holds a JSON integer array (`[123, 456]`). One in-memory copy is
//! authoritative for reads; every mutation is written through to disk before
//! it becomes visible.

use std::{
    collections::BTreeSet,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use {
    tokio::{fs, io::AsyncWriteExt, sync::Mutex},
    tracing::{debug, error, info, warn},
};

use crate::{
    error::{Error, Result},
    transport::OperatorNotifier,
    types::TopicId,
};

/// State of a topic after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Silenced,
    Unsilenced,
}

pub struct TopicRegistry {
    path: PathBuf,
    topics: RwLock<BTreeSet<TopicId>>,
    /// Serializes read-modify-write cycles. Held across the disk write only.
    write_lock: Mutex<()>,
}

impl TopicRegistry {
    /// Load the registry from `path`.
    ///
    /// Never fails: a missing file starts empty and is initialized to `[]`;
    /// an unreadable or corrupt file also starts empty (silencing is lost,
    /// never invented), is kept aside as `<file>.<timestamp>.bak`, and the
    /// operator is told.
    pub async fn load(path: impl Into<PathBuf>, notifier: &dyn OperatorNotifier) -> Self {
        let path = path.into();

        let topics = match read_topics(&path).await {
            Ok(Some(topics)) => {
                info!(path = %path.display(), count = topics.len(), "loaded silenced topics");
                topics
            },
            Ok(None) => {
                info!(path = %path.display(), "no registry file, starting empty");
                initialize(&path, notifier).await;
                BTreeSet::new()
            },
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load silenced topics");
                let backup = backup_path(&path).await;
                let kept = match fs::rename(&path, &backup).await {
                    Ok(()) => {
                        warn!(backup = %backup.display(), "kept unreadable registry aside");
                        format!("\nThe old file was kept as {}.", backup.display())
                    },
                    Err(err) => {
                        debug!(error = %err, "could not move unreadable registry aside");
                        String::new()
                    },
                };
                notifier
                    .notify(&format!(
                        "❌ Could not load silenced topics: {e}\nStarting with no topic silenced.{kept}"
                    ))
                    .await;
                initialize(&path, notifier).await;
                BTreeSet::new()
            },
        };

        Self {
            path,
            topics: RwLock::new(topics),
            write_lock: Mutex::new(()),
        }
    }

    /// Read the topics stored at `path` without touching the file.
    ///
    /// A missing file reads as empty.
    pub async fn peek(path: &Path) -> Result<Vec<TopicId>> {
        Ok(read_topics(path)
            .await?
            .map(|topics| topics.into_iter().collect())
            .unwrap_or_default())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn contains(&self, topic: TopicId) -> bool {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&topic)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Silenced topics in ascending order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TopicId> {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// Flip `topic` and persist the new set before returning.
    ///
    /// If the write fails the in-memory set is left untouched, so memory and
    /// disk never disagree about an acknowledged toggle.
    pub async fn toggle(&self, topic: TopicId) -> Result<ToggleOutcome> {
        let _guard = self.write_lock.lock().await;

        let mut next = self
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let outcome = if next.remove(&topic) {
            ToggleOutcome::Unsilenced
        } else {
            next.insert(topic);
            ToggleOutcome::Silenced
        };

        write_topics(&self.path, &next).await?;
        *self.topics.write().unwrap_or_else(PoisonError::into_inner) = next;

        debug!(topic_id = %topic, ?outcome, "registry toggled");
        Ok(outcome)
    }

    /// Write the current set to disk.
    pub async fn save(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let current = self
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        write_topics(&self.path, &current).await
    }
}

async fn initialize(path: &Path, notifier: &dyn OperatorNotifier) {
    if let Err(e) = write_topics(path, &BTreeSet::new()).await {
        warn!(path = %path.display(), error = %e, "failed to initialize registry file");
        notifier
            .notify(&format!("❌ Could not initialize the silenced topics file: {e}"))
            .await;
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_topics(path: &Path) -> Result<Option<BTreeSet<TopicId>>> {
    let data = match fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::storage(path, e)),
    };

    if data.trim().is_empty() {
        return Ok(Some(BTreeSet::new()));
    }

    let raw: Vec<i64> = serde_json::from_str(&data).map_err(|source| Error::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let mut topics = BTreeSet::new();
    for id in raw {
        match i32::try_from(id).ok().and_then(TopicId::new) {
            Some(topic) => {
                topics.insert(topic);
            },
            None => warn!(path = %path.display(), topic_id = id, "dropping invalid topic id"),
        }
    }
    Ok(Some(topics))
}

/// Atomic write: temp file, fsync, rename over the target.
async fn write_topics(path: &Path, topics: &BTreeSet<TopicId>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::storage(parent, e))?;
    }

    let json = serde_json::to_vec(topics)
        .map_err(|e| Error::storage(path, std::io::Error::other(e)))?;

    let tmp = sibling(path, ".tmp");
    let written = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(Error::storage(path, e));
    }
    Ok(())
}

/// `<file>.<UTC timestamp>.bak`, made unique among existing backups.
async fn backup_path(path: &Path) -> PathBuf {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
    let mut backup = sibling(path, &format!(".{stamp}.bak"));
    let mut n = 1;
    while fs::try_exists(&backup).await.unwrap_or(false) {
        backup = sibling(path, &format!(".{stamp}-{n}.bak"));
        n += 1;
    }
    backup
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("silenced_topics.json"));
    name.push(suffix);
    path.with_file_name(name)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{test_support::RecordingNotifier, transport::NoopNotifier},
        std::sync::Arc,
        tempfile::TempDir,
    };

    fn topic(id: i32) -> TopicId {
        TopicId::new(id).unwrap()
    }

    #[tokio::test]
    async fn missing_file_starts_empty_and_is_initialized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");

        let registry = TopicRegistry::load(&path, &NoopNotifier).await;

        assert!(registry.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn peek_has_no_side_effects() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");

        assert!(TopicRegistry::peek(&path).await.unwrap().is_empty());
        assert!(!path.exists());

        std::fs::write(&path, "[9, 2]").unwrap();
        assert_eq!(TopicRegistry::peek(&path).await.unwrap(), vec![topic(2), topic(9)]);

        std::fs::write(&path, "{").unwrap();
        assert!(TopicRegistry::peek(&path).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{");
    }

    #[tokio::test]
    async fn loads_existing_wire_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        std::fs::write(&path, "[456, 123]").unwrap();

        let registry = TopicRegistry::load(&path, &NoopNotifier).await;

        assert_eq!(registry.snapshot(), vec![topic(123), topic(456)]);
        assert!(registry.contains(topic(123)));
        assert!(!registry.contains(topic(7)));
    }

    #[tokio::test]
    async fn whitespace_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        std::fs::write(&path, "  \n").unwrap();

        let registry = TopicRegistry::load(&path, &NoopNotifier).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_fails_open_and_notifies() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        std::fs::write(&path, "{not json").unwrap();
        let notifier = RecordingNotifier::default();

        let registry = TopicRegistry::load(&path, &notifier).await;

        assert!(registry.is_empty());
        let backups = backups(tmp.path());
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), "{not json");
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("Could not load"));
        assert!(notices[0].contains(&backups[0].display().to_string()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn repeated_corruption_keeps_every_backup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");

        std::fs::write(&path, "first").unwrap();
        TopicRegistry::load(&path, &NoopNotifier).await;
        std::fs::write(&path, "second").unwrap();
        TopicRegistry::load(&path, &NoopNotifier).await;

        let mut contents: Vec<_> = backups(tmp.path())
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, ["first", "second"]);
    }

    #[tokio::test]
    async fn zero_and_out_of_range_ids_are_dropped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        std::fs::write(&path, "[0, 7, 99999999999]").unwrap();

        let registry = TopicRegistry::load(&path, &NoopNotifier).await;
        assert_eq!(registry.snapshot(), vec![topic(7)]);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state_and_persists_each_step() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        let registry = TopicRegistry::load(&path, &NoopNotifier).await;

        assert_eq!(
            registry.toggle(topic(7)).await.unwrap(),
            ToggleOutcome::Silenced
        );
        assert!(registry.contains(topic(7)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[7]");

        assert_eq!(
            registry.toggle(topic(7)).await.unwrap(),
            ToggleOutcome::Unsilenced
        );
        assert!(!registry.contains(topic(7)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn save_load_is_a_fixed_point() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        std::fs::write(&path, "[9, 3, 3, 5]").unwrap();

        let first = TopicRegistry::load(&path, &NoopNotifier).await;
        first.save().await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[3,5,9]");

        for _ in 0..3 {
            let again = TopicRegistry::load(&path, &NoopNotifier).await;
            again.save().await.unwrap();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
        }
    }

    #[tokio::test]
    async fn concurrent_toggles_do_not_lose_updates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silenced_topics.json");
        let registry = Arc::new(TopicRegistry::load(&path, &NoopNotifier).await);

        let mut handles = Vec::new();
        for id in 1..=20 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move { registry.toggle(topic(id)).await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), ToggleOutcome::Silenced);
        }

        assert_eq!(registry.len(), 20);
        let reloaded = TopicRegistry::load(&path, &NoopNotifier).await;
        assert_eq!(reloaded.snapshot(), registry.snapshot());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let tmp = TempDir::new().unwrap();
        // The registry path is a directory, so the final rename fails.
        let path = tmp.path().join("occupied");
        std::fs::create_dir_all(path.join("child")).unwrap();
        let registry = TopicRegistry {
            path: path.clone(),
            topics: RwLock::new(BTreeSet::new()),
            write_lock: Mutex::new(()),
        };

        let err = registry.toggle(topic(7)).await.unwrap_err();

        assert!(err.is_storage(), "{err}");
        assert!(!registry.contains(topic(7)));
        assert!(!tmp.path().join("occupied.tmp").exists());
    }

    fn backups(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "bak"))
            .collect()
    }

    #[test]
    fn sibling_appends_suffix() {
        assert_eq!(
            sibling(Path::new("/data/silenced_topics.json"), ".tmp"),
            PathBuf::from("/data/silenced_topics.json.tmp")
        );
    }
}
