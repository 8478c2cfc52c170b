//! Snapshot creation, listing and restore.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use super::snapshot::{Snapshot, SnapshotEntry, SnapshotMetadata, file_name_for, is_snapshot_name};
use crate::domain::{EntryStats, NewEntry};
use crate::error::AppError;
use crate::persistence::EntryStore;

/// Writes and reads JSON snapshots of the entry store in one directory.
///
/// Snapshots are self-contained: restoring one needs nothing but the file.
#[derive(Debug)]
pub struct BackupManager {
    store: Arc<EntryStore>,
    dir: PathBuf,
}

impl BackupManager {
    /// Creates a manager writing into `dir`. The directory is created lazily
    /// on the first backup.
    #[must_use]
    pub fn new(store: Arc<EntryStore>, dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            dir: dir.into(),
        }
    }

    /// Directory holding the snapshots.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Captures every entry into a new timestamped snapshot file and returns
    /// its path.
    ///
    /// The document is written to a hidden temporary file and renamed into
    /// place, so a crash never leaves a truncated `backup-*.json` behind.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the store cannot be read, or
    /// [`AppError::BackupIo`] if the directory or file cannot be written.
    pub async fn create_backup(&self) -> Result<PathBuf, AppError> {
        let now = Utc::now();
        let entries = self.store.list().await?;
        let stats = EntryStats::from_entries(&entries, now);
        let snapshot = Snapshot {
            timestamp: now,
            metadata: SnapshotMetadata::from_stats(&stats),
            excel_data: entries,
        };
        let body = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| AppError::BackupIo(format!("failed to serialize snapshot: {e}")))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error("create", &self.dir, &e))?;

        let file_name = file_name_for(now);
        let path = self.dir.join(&file_name);
        let tmp = self.dir.join(format!(".{file_name}.tmp"));

        if let Err(e) = tokio::fs::write(&tmp, &body).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error("write", &tmp, &e));
        }
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error("rename", &tmp, &e))?;

        tracing::info!(
            path = %path.display(),
            total_files = stats.total_files,
            total_records = stats.total_records,
            "backup created"
        );
        Ok(path)
    }

    /// Re-creates every entry in the snapshot at `path` and returns how many
    /// were restored.
    ///
    /// Restore is additive: entries get fresh ids and timestamps, and nothing
    /// already in the store is removed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackupNotFound`] if the file does not exist,
    /// [`AppError::SnapshotParse`] if it is not a snapshot document, or
    /// [`AppError::Persistence`] if an entry cannot be stored. Entries
    /// stored before a failure stay stored.
    pub async fn restore_from_backup(&self, path: &Path) -> Result<usize, AppError> {
        let raw = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::BackupNotFound(path.display().to_string())
            } else {
                io_error("read", path, &e)
            }
        })?;
        let snapshot: Snapshot<SnapshotEntry> = serde_json::from_slice(&raw)
            .map_err(|e| AppError::SnapshotParse(format!("{}: {e}", path.display())))?;

        let mut restored = 0usize;
        for entry in snapshot.excel_data {
            self.store.create(NewEntry::from(entry)).await?;
            restored += 1;
        }

        tracing::info!(
            path = %path.display(),
            restored,
            taken_at = %snapshot.timestamp,
            "backup restored"
        );
        Ok(restored)
    }

    /// Restores a snapshot by file name, resolved inside the backup
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] if `file_name` is not a bare file
    /// name, otherwise as [`Self::restore_from_backup`].
    pub async fn restore_named(&self, file_name: &str) -> Result<usize, AppError> {
        let mut components = Path::new(file_name).components();
        let is_bare = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_bare {
            return Err(AppError::InvalidRequest(format!(
                "invalid backup file name: {file_name:?}"
            )));
        }
        self.restore_from_backup(&self.dir.join(file_name)).await
    }

    /// Snapshot file names in the backup directory, newest first.
    ///
    /// A missing directory means no backups yet and yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BackupIo`] if the directory cannot be read.
    pub async fn list_backups(&self) -> Result<Vec<String>, AppError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read", &self.dir, &e)),
        };

        let mut names = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| io_error("read", &self.dir, &e))?
        {
            if let Some(name) = item.file_name().to_str()
                && is_snapshot_name(name)
            {
                names.push(name.to_string());
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> AppError {
    AppError::BackupIo(format!("failed to {action} {}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Month, Row};
    use serde_json::json;

    fn manager(dir: &Path) -> BackupManager {
        BackupManager::new(Arc::new(EntryStore::in_memory()), dir)
    }

    fn sample(records: i32) -> NewEntry {
        let mut row = Row::new();
        row.insert("sku".to_string(), json!("A-1"));
        let label = Some("stock.xlsx".to_string());
        let mut new = NewEntry::counted(Month::May, 2024, label, vec![row]);
        new.record_count = records;
        new
    }

    #[tokio::test]
    async fn backup_then_restore_into_empty_store() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let source = manager(tmp.path());
        tokio_test::assert_ok!(source.store.create(sample(5)).await);
        tokio_test::assert_ok!(source.store.create(sample(3)).await);

        let Ok(path) = source.create_backup().await else {
            panic!("backup failed");
        };
        assert!(path.starts_with(tmp.path()));

        let target = manager(tmp.path());
        let Ok(restored) = target.restore_from_backup(&path).await else {
            panic!("restore failed");
        };
        assert_eq!(restored, 2);

        let Ok(stats) = target.store.stats().await else {
            panic!("stats failed");
        };
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_records, 8);

        let Ok(entries) = target.store.list().await else {
            panic!("list failed");
        };
        assert!(
            entries
                .iter()
                .all(|e| e.file_name.as_deref() == Some("stock.xlsx") && e.data.len() == 1)
        );
    }

    #[tokio::test]
    async fn snapshot_document_has_expected_shape() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let backups = manager(tmp.path());
        tokio_test::assert_ok!(backups.store.create(sample(7)).await);

        let Ok(path) = backups.create_backup().await else {
            panic!("backup failed");
        };
        let Ok(raw) = std::fs::read(&path) else {
            panic!("read failed");
        };
        let Ok(doc) = serde_json::from_slice::<serde_json::Value>(&raw) else {
            panic!("not json");
        };
        assert_eq!(doc["metadata"]["version"], "1.0.0");
        assert_eq!(doc["metadata"]["totalUsers"], 0);
        assert_eq!(doc["metadata"]["totalFiles"], 1);
        assert_eq!(doc["metadata"]["totalRecords"], 7);
        assert_eq!(doc["excelData"][0]["recordCount"], 7);
        assert!(doc["timestamp"].is_string());
    }

    #[tokio::test]
    async fn restore_is_additive() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let backups = manager(tmp.path());
        tokio_test::assert_ok!(backups.store.create(sample(2)).await);
        let Ok(path) = backups.create_backup().await else {
            panic!("backup failed");
        };

        tokio_test::assert_ok!(backups.restore_from_backup(&path).await);
        let Ok(stats) = backups.store.stats().await else {
            panic!("stats failed");
        };
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_records, 4);
    }

    #[tokio::test]
    async fn missing_snapshot_is_not_found() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let backups = manager(tmp.path());
        assert!(matches!(
            backups.restore_named("backup-nope.json").await,
            Err(AppError::BackupNotFound(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_parse_error() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let path = tmp.path().join("backup-bad.json");
        if std::fs::write(&path, b"{not json").is_err() {
            panic!("write failed");
        }
        let backups = manager(tmp.path());
        assert!(matches!(
            backups.restore_from_backup(&path).await,
            Err(AppError::SnapshotParse(_))
        ));
        assert!(tokio_test::assert_ok!(backups.store.list().await).is_empty());
    }

    #[tokio::test]
    async fn restore_named_rejects_paths() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let backups = manager(tmp.path());
        for name in ["../backup-x.json", "sub/backup-x.json", "/etc/passwd", "..", ""] {
            assert!(
                matches!(
                    backups.restore_named(name).await,
                    Err(AppError::InvalidRequest(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_skips_other_files() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        for name in [
            "backup-2024-01-01T00-00-00-000000Z.json",
            "backup-2024-02-01T00-00-00-000000Z.json",
            "notes.txt",
            ".backup-2024-03-01T00-00-00-000000Z.json.tmp",
        ] {
            if std::fs::write(tmp.path().join(name), b"{}").is_err() {
                panic!("write failed");
            }
        }
        let backups = manager(tmp.path());
        let Ok(names) = backups.list_backups().await else {
            panic!("list failed");
        };
        assert_eq!(
            names,
            vec![
                "backup-2024-02-01T00-00-00-000000Z.json".to_string(),
                "backup-2024-01-01T00-00-00-000000Z.json".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn list_without_directory_is_empty() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let backups = manager(&tmp.path().join("never-created"));
        let Ok(names) = backups.list_backups().await else {
            panic!("list failed");
        };
        assert!(names.is_empty());
    }
}
