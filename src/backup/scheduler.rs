//! Periodic backup task.
//!
//! Runs one backup immediately, then one per interval, until stopped. A
//! failed run is logged and the schedule continues.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::manager::BackupManager;

/// Handle to a running backup schedule.
///
/// Dropping the handle without calling [`BackupScheduler::stop`] also ends
/// the task, at its next wakeup.
#[derive(Debug)]
pub struct BackupScheduler {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    runs: Arc<AtomicU64>,
}

impl BackupScheduler {
    /// Spawns the schedule on the current Tokio runtime.
    #[must_use]
    pub fn start(manager: Arc<BackupManager>, interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let runs = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&runs);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_secs = interval.as_secs(), "backup scheduler started");

            loop {
                tokio::select! {
                    biased;

                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        if let Err(e) = manager.create_backup().await {
                            tracing::error!(error = %e, "scheduled backup failed");
                        }
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }

            tracing::info!("backup scheduler stopped");
        });

        Self {
            stop_tx,
            task,
            runs,
        }
    }

    /// Number of scheduled runs attempted so far, successful or not.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Stops the schedule and waits for the task to exit. A backup already
    /// in progress finishes first.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "backup scheduler task ended abnormally");
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::EntryStore;

    #[tokio::test]
    async fn first_backup_runs_immediately() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let manager = Arc::new(BackupManager::new(
            Arc::new(EntryStore::in_memory()),
            tmp.path(),
        ));
        let scheduler = BackupScheduler::start(Arc::clone(&manager), Duration::from_secs(3600));

        tokio::time::sleep(Duration::from_millis(200)).await;
        scheduler.stop().await;

        let names = tokio_test::assert_ok!(manager.list_backups().await);
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn no_backups_after_stop() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        let manager = Arc::new(BackupManager::new(
            Arc::new(EntryStore::in_memory()),
            tmp.path(),
        ));
        let scheduler = BackupScheduler::start(Arc::clone(&manager), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;

        let before = tokio_test::assert_ok!(manager.list_backups().await).len();
        assert!(before >= 1);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let after = tokio_test::assert_ok!(manager.list_backups().await).len();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_schedule() {
        let Ok(tmp) = tempfile::tempdir() else {
            panic!("tempdir failed");
        };
        // A regular file where the directory should be makes every run fail.
        let blocked = tmp.path().join("blocked");
        if std::fs::write(&blocked, b"").is_err() {
            panic!("write failed");
        }
        let manager = Arc::new(BackupManager::new(
            Arc::new(EntryStore::in_memory()),
            &blocked,
        ));
        let scheduler = BackupScheduler::start(manager, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(scheduler.runs() >= 2);
        scheduler.stop().await;
    }
}
