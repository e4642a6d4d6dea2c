use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::ClassificationLabel;

/// URL → label map that lives for the lifetime of the process.
///
/// Keys are used verbatim. Entries are only ever added; the page monitor
/// checks `has` before classifying, so `set` on an existing key only happens
/// when two requests for the same URL race, in which case the last write wins.
#[derive(Debug, Default)]
pub struct ClassificationCache {
    entries: RwLock<HashMap<String, ClassificationLabel>>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> ClassificationLabel {
        self.entries.read().get(url).cloned().unwrap_or_default()
    }

    pub fn has(&self, url: &str) -> bool {
        self.entries.read().contains_key(url)
    }

    pub fn set(&self, url: &str, label: ClassificationLabel) {
        if let Some(previous) = self.entries.write().insert(url.to_string(), label) {
            tracing::debug!(
                target: "cache",
                url,
                previous = %previous,
                "overwrote existing classification"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
