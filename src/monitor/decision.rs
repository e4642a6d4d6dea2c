use crate::domain::{LoadStatus, PageEvent};

/// Prefix match on `http`, so `https` qualifies and so would `httpfoo:`.
/// Browser-internal and local-file pages are never sent to the classifier.
pub fn is_classifiable_url(url: &str) -> bool {
    url.starts_with("http") && !url.starts_with("chrome://") && !url.starts_with("file://")
}

/// URL an event asks us to classify, ignoring cache state.
pub fn target_url(event: &PageEvent) -> Option<&str> {
    if let PageEvent::PageLoaded { status, .. } = event {
        if *status != LoadStatus::Complete {
            return None;
        }
    }
    event.url().filter(|url| is_classifiable_url(url))
}
