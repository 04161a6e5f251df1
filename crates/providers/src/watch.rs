//! Library change notification.
//!
//! A process-wide event source with an explicit subscribe/unsubscribe
//! lifecycle: `ChangeNotifier` fans a payload-free "changes may exist"
//! signal out to every live `ChangeSubscription`, and dropping a
//! subscription unsubscribes it.

use musiclib_bridge_core::LibraryEvent;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::sync::broadcast;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<LibraryEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Fire-and-forget. Delivery to zero subscribers is not an error.
    pub fn notify(&self) {
        let _ = self.tx.send(LibraryEvent::Changed);
    }

    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ChangeSubscription {
    rx: broadcast::Receiver<LibraryEvent>,
}

impl ChangeSubscription {
    /// Waits for the next change signal. A lagged receiver coalesces the
    /// missed events into one signal; `None` means the notifier shut down.
    pub async fn next(&mut self) -> Option<LibraryEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => Some(LibraryEvent::Changed),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

/// Cheap change fingerprint: file count plus the newest modification time
/// under the roots.
fn fingerprint(roots: &[PathBuf]) -> (usize, Option<SystemTime>) {
    let mut count = 0usize;
    let mut latest: Option<SystemTime> = None;

    for root in roots {
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                count += 1;
                if let Ok(meta) = entry.metadata() {
                    if let Ok(modified) = meta.modified() {
                        latest = latest.max(Some(modified));
                    }
                }
            }
        }
    }

    (count, latest)
}

/// Polls the roots' fingerprint and signals the notifier on change.
/// The host filesystem has no portable change API, so this mirrors how the
/// bridge watches config files: by mtime.
pub fn spawn_mtime_watcher(
    roots: Vec<PathBuf>,
    poll: Duration,
    notifier: ChangeNotifier,
) -> tokio::task::JoinHandle<()> {
    // Baseline is taken before spawning, so changes made right after this
    // call returns are already visible to the first poll.
    let mut known = fingerprint(&roots);
    tokio::spawn(async move {
        let sleep = poll.max(Duration::from_millis(100));
        loop {
            tokio::time::sleep(sleep).await;
            let current = fingerprint(&roots);
            if current != known {
                known = current;
                debug!("library fingerprint changed");
                notifier.notify();
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{spawn_mtime_watcher, ChangeNotifier};
    use musiclib_bridge_core::LibraryEvent;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn subscribers_receive_notifications() {
        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();

        notifier.notify();
        assert_eq!(sub.next().await, Some(LibraryEvent::Changed));
    }

    #[tokio::test]
    async fn dropping_a_subscription_unsubscribes_it() {
        let notifier = ChangeNotifier::new();
        let first = notifier.subscribe();
        let second = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 2);

        drop(first);
        drop(second);
        assert_eq!(notifier.subscriber_count(), 0);

        // Notifying with no subscribers is fine.
        notifier.notify();
    }

    #[tokio::test]
    async fn watcher_signals_on_new_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"junk").unwrap();

        let notifier = ChangeNotifier::new();
        let mut sub = notifier.subscribe();
        let handle = spawn_mtime_watcher(
            vec![dir.path().to_path_buf()],
            Duration::from_millis(100),
            notifier,
        );

        fs::write(dir.path().join("b.mp3"), b"junk").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), sub.next())
            .await
            .expect("watcher should signal within the timeout");
        assert_eq!(event, Some(LibraryEvent::Changed));

        handle.abort();
    }
}
