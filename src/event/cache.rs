use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::foundation::core::LayoutId;

/// Per-event store of precalculated layout output, keyed by layout instance.
///
/// Written on the producing thread by `Layout::precalculate` and read by `formatted_message` on
/// whichever thread renders the event later.
#[derive(Debug, Default)]
pub struct PrecalcCache {
    values: Mutex<HashMap<LayoutId, String>>,
}

impl PrecalcCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached output for `id`, if any.
    pub fn get(&self, id: LayoutId) -> Option<String> {
        self.lock().get(&id).cloned()
    }

    /// Store `value` for `id`, replacing a previous value.
    pub fn insert(&self, id: LayoutId, value: String) {
        self.lock().insert(id, value);
    }

    pub fn contains(&self, id: LayoutId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached value.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // Poisoning is ignored: the map only holds plain strings.
    fn lock(&self) -> MutexGuard<'_, HashMap<LayoutId, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for PrecalcCache {
    fn clone(&self) -> Self {
        Self {
            values: Mutex::new(self.lock().clone()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/event/cache.rs"]
mod tests;
