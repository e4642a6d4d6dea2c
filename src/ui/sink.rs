use super::state::{Alert, BadgeState};

/// Receiver for derived UI state. Implementations must not block.
pub trait UiSink: Send + Sync {
    fn set_badge(&self, badge: &BadgeState);
    fn notify(&self, alert: &Alert);
}
