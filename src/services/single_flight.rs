use std::{
    collections::HashMap,
    sync::{Arc, Mutex, Weak},
};

use tokio::sync::OnceCell;

/// Per-key result slots shared by concurrent callers.
///
/// The first caller to initialise a key's slot runs the work; callers that arrive while the
/// slot is alive receive the same value without depending on any external store. A slot lives
/// only while someone holds it, so a later request starts a fresh flight.
pub struct SingleFlight<V> {
    slots: Mutex<HashMap<String, Weak<OnceCell<V>>>>,
}

impl<V> Default for SingleFlight<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> SingleFlight<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` unless a flight for `key` is already in progress or finished and still held.
    /// Returns the value and whether this caller ran the work.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> (V, bool)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = V>,
    {
        let slot = self.slot_for(key);
        let mut led = false;
        let led_flag = &mut led;
        let value = slot
            .get_or_init(move || {
                *led_flag = true;
                work()
            })
            .await
            .clone();
        (value, led)
    }

    fn slot_for(&self, key: &str) -> Arc<OnceCell<V>> {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = slots.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let slot = Arc::new(OnceCell::new());
        slots.insert(key.to_string(), Arc::downgrade(&slot));
        slot
    }

    /// Number of keys with a live slot.
    pub fn active_keys(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots.values().filter(|weak| weak.strong_count() > 0).count()
    }
}
