//! One-shot watch for a file being moved.
//!
//! Armed before the folder picker opens. The subscription lives inside the
//! watch, so every exit path (move observed, picker cancelled, rename failed)
//! releases it when the watch is dropped.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::events::{EventBus, Subscription, VaultEvent};
use crate::host::Workspace;

/// Delay between checks while waiting for the host to report the move.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Number of checks before giving up.
pub const MAX_POLLS: u32 = 20;

pub struct MoveWatch {
    moved_to: Arc<Mutex<Option<String>>>,
    _subscription: Subscription,
}

impl MoveWatch {
    /// Watch for a rename whose old path is `old_path`.
    pub fn arm(events: &Arc<EventBus>, old_path: &str) -> Self {
        let moved_to = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&moved_to);
        let watched = old_path.to_string();

        let subscription = events.subscribe(move |event| {
            if let VaultEvent::Renamed { path, old_path } = event {
                if *old_path == watched {
                    let mut slot = sink.lock().unwrap_or_else(|e| e.into_inner());
                    if slot.is_none() {
                        *slot = Some(path.clone());
                    }
                }
            }
        });

        Self {
            moved_to,
            _subscription: subscription,
        }
    }

    /// New path of the file, once the move has been observed.
    pub fn moved_to(&self) -> Option<String> {
        self.moved_to
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Wait (through the workspace timer) until the move is observed, up to
    /// `MAX_POLLS` intervals.
    pub async fn settle<W: Workspace + ?Sized>(&self, workspace: &W) -> Option<String> {
        for _ in 0..MAX_POLLS {
            if let Some(path) = self.moved_to() {
                return Some(path);
            }
            workspace.sleep(POLL_INTERVAL).await;
        }
        self.moved_to()
    }
}
