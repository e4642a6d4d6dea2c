use std::sync::Arc;

use serde::Serialize;

use crate::{cache::ClassificationCache, domain::ClassificationLabel};

/// What the popup shows for a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub text: &'static str,
    pub class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub url: String,
    pub label: ClassificationLabel,
    pub view: StatusView,
}

impl StatusView {
    pub fn for_label(label: &ClassificationLabel) -> Self {
        match label {
            ClassificationLabel::Unknown => StatusView {
                text: "⏳ Checking...",
                class: "neutral",
            },
            ClassificationLabel::Phishing => StatusView {
                text: "⚠️ Phishing Website",
                class: "phishing",
            },
            ClassificationLabel::Legitimate | ClassificationLabel::Other(_) => StatusView {
                text: "✅ Legitimate Website",
                class: "safe",
            },
        }
    }
}

/// Side-effect free read path over the classification cache.
#[derive(Clone)]
pub struct StatusReader {
    cache: Arc<ClassificationCache>,
}

impl StatusReader {
    pub fn new(cache: Arc<ClassificationCache>) -> Self {
        Self { cache }
    }

    pub fn label(&self, url: &str) -> ClassificationLabel {
        self.cache.get(url)
    }

    pub fn query(&self, url: &str) -> StatusReport {
        let label = self.label(url);
        StatusReport {
            url: url.to_string(),
            view: StatusView::for_label(&label),
            label,
        }
    }
}
