//! Single-slot store for received text. Fills exactly once.

use tokio::sync::{Mutex, Notify};

/// First-write-wins text cell. The lock is scoped to the check-and-set only,
/// never held across I/O.
pub struct TextSlot {
    value: Mutex<Option<String>>,
    filled: Notify,
}

impl TextSlot {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            filled: Notify::new(),
        }
    }

    /// Atomically transition empty -> filled. Returns false if another writer
    /// already won; the stored value is never replaced.
    pub async fn try_fill(&self, text: String) -> bool {
        {
            let mut slot = self.value.lock().await;
            if slot.is_some() {
                return false;
            }
            *slot = Some(text);
        }
        self.filled.notify_waiters();
        true
    }

    pub async fn is_filled(&self) -> bool {
        self.value.lock().await.is_some()
    }

    pub async fn value(&self) -> Option<String> {
        self.value.lock().await.clone()
    }

    /// Resolves with the stored value once the first write lands.
    pub async fn wait_filled(&self) -> String {
        loop {
            // Register before checking so a fill between the check and the
            // await still wakes us.
            let notified = self.filled.notified();
            if let Some(value) = self.value().await {
                return value;
            }
            notified.await;
        }
    }
}

impl Default for TextSlot {
    fn default() -> Self {
        Self::new()
    }
}
