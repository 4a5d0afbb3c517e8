//! Debounced settings writes.
//!
//! Each edit schedules a write of one key after a quiet period. Scheduling
//! again for the same key supersedes the earlier edit, so only the last edit
//! of a burst reaches storage. Keys are independent of each other.
//!
//! A superseded task is never aborted: it wakes, sees that its edit is stale
//! and skips the write. Writes that have started always run to completion.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::storage::{SettingsMap, SettingsStorage};

/// Quiet period before an edit is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDelay {
    /// Checkboxes, files, pointer selections.
    Immediate,
    /// Sliders and their number fields.
    Slider,
    /// Text fields and keyboard-driven selections.
    Typing,
}

impl SaveDelay {
    pub fn duration(self) -> Duration {
        match self {
            SaveDelay::Immediate => Duration::ZERO,
            SaveDelay::Slider => Duration::from_millis(250),
            SaveDelay::Typing => Duration::from_millis(750),
        }
    }
}

/// Per-key scheduler of delayed writes.
pub struct Debouncer<S: SettingsStorage> {
    storage: Arc<S>,
    /// Latest edit number per key.
    generations: HashMap<String, Arc<AtomicU64>>,
    /// Held across the staleness check and the write, so an older edit can
    /// never land after a newer one for the same key.
    write_turn: Arc<Mutex<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<S: SettingsStorage> Debouncer<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            generations: HashMap::new(),
            write_turn: Arc::new(Mutex::new(())),
            tasks: Vec::new(),
        }
    }

    /// Write `key = value` once `delay` has passed without another edit to
    /// the same key. Must be called from within a tokio runtime.
    pub fn schedule(&mut self, key: &str, value: Value, delay: SaveDelay) {
        self.tasks.retain(|task| !task.is_finished());

        let latest = Arc::clone(self.generations.entry(key.to_string()).or_default());
        let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;

        let storage = Arc::clone(&self.storage);
        let write_turn = Arc::clone(&self.write_turn);
        let owned_key = key.to_string();
        let wait = delay.duration();
        self.tasks.push(tokio::spawn(async move {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            let _turn = write_turn.lock().await;
            if latest.load(Ordering::SeqCst) != generation {
                tracing::trace!("edit {generation} of {owned_key} superseded");
                return;
            }
            let mut values = SettingsMap::new();
            values.insert(owned_key.clone(), value);
            match storage.set(values).await {
                Ok(()) => tracing::debug!("saved option {owned_key}"),
                Err(e) => tracing::warn!("failed to save option {owned_key}: {e}"),
            }
        }));
    }

    /// Wait for every scheduled write to land. Used before exiting so the
    /// final edits are not lost.
    pub async fn settle(&mut self) {
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::warn!("settings save task failed: {e}");
            }
        }
    }
}
