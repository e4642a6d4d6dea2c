use std::{collections::HashSet, sync::Arc};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::{
    cache::ClassificationCache,
    classifier::Classifier,
    config::MonitorConfig,
    domain::{ClassificationLabel, PageEvent},
    ui::{UiSink, UiUpdate},
};

use super::decision::target_url;

type InFlightSet = Arc<Mutex<HashSet<String>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Classified(ClassificationLabel),
    /// The classifier call failed; nothing was cached.
    Failed,
}

/// Turns navigation signals into classifications, cache writes and UI updates.
///
/// Each qualifying URL is classified on its own task. Without in-flight
/// tracking two triggers for the same unseen URL can both reach the
/// classifier; both results are written and the last one to land wins.
pub struct PageMonitor {
    cache: Arc<ClassificationCache>,
    classifier: Arc<dyn Classifier>,
    ui: Arc<dyn UiSink>,
    in_flight: Option<InFlightSet>,
}

/// Marks a URL as in flight until dropped.
struct InFlightClaim {
    set: Option<InFlightSet>,
    url: String,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        if let Some(set) = &self.set {
            set.lock().remove(&self.url);
        }
    }
}

impl PageMonitor {
    pub fn new(
        cache: Arc<ClassificationCache>,
        classifier: Arc<dyn Classifier>,
        ui: Arc<dyn UiSink>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            cache,
            classifier,
            ui,
            in_flight: config
                .dedup_in_flight
                .then(|| Arc::new(Mutex::new(HashSet::new()))),
        }
    }

    /// Decides whether `event` needs classification and, if so, spawns it.
    ///
    /// The returned handle is informational; dropping it does not cancel the
    /// request.
    pub fn handle(self: &Arc<Self>, event: &PageEvent) -> Option<JoinHandle<CheckOutcome>> {
        let url = target_url(event)?;
        if self.cache.has(url) {
            tracing::trace!(target: "monitor", url, "already classified");
            return None;
        }
        let claim = self.claim(url)?;

        let monitor = Arc::clone(self);
        Some(tokio::spawn(async move { monitor.run(claim).await }))
    }

    fn claim(&self, url: &str) -> Option<InFlightClaim> {
        if let Some(set) = &self.in_flight {
            if !set.lock().insert(url.to_string()) {
                tracing::debug!(target: "monitor", url, "classification already in flight");
                return None;
            }
        }
        Some(InFlightClaim {
            set: self.in_flight.clone(),
            url: url.to_string(),
        })
    }

    async fn run(&self, claim: InFlightClaim) -> CheckOutcome {
        let url = claim.url.as_str();
        tracing::debug!(target: "monitor", url, "requesting classification");

        match self.classifier.classify(url).await {
            Ok(label) => {
                self.cache.set(url, label.clone());
                tracing::info!(target: "monitor", url, label = %label, "url classified");
                self.publish(url, &label);
                CheckOutcome::Classified(label)
            }
            Err(err) => {
                let detail = format!("{err:#}");
                tracing::error!(target: "monitor", url, error = %detail, "prediction error");
                CheckOutcome::Failed
            }
        }
    }

    fn publish(&self, url: &str, label: &ClassificationLabel) {
        let update = UiUpdate::derive(url, label);
        self.ui.set_badge(&update.badge);
        if let Some(alert) = &update.alert {
            self.ui.notify(alert);
        }
    }
}
