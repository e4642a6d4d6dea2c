use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::ClassificationLabel;

pub const ALERT_TITLE: &str = "⚠️ Phishing Website Detected";

const DANGER_COLOR: &str = "#d93025";
const SAFE_COLOR: &str = "#188038";
const NEUTRAL_COLOR: &str = "#888";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeState {
    pub text: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub url: String,
    pub detected_at: DateTime<Utc>,
}

/// UI state pushed after one successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiUpdate {
    pub badge: BadgeState,
    pub alert: Option<Alert>,
}

impl BadgeState {
    pub fn for_label(label: &ClassificationLabel) -> Self {
        match label {
            ClassificationLabel::Phishing => BadgeState {
                text: "!",
                color: DANGER_COLOR,
            },
            ClassificationLabel::Legitimate => BadgeState {
                text: "OK",
                color: SAFE_COLOR,
            },
            ClassificationLabel::Unknown | ClassificationLabel::Other(_) => BadgeState {
                text: "?",
                color: NEUTRAL_COLOR,
            },
        }
    }
}

impl Alert {
    pub fn phishing(url: &str, detected_at: DateTime<Utc>) -> Self {
        Self {
            title: ALERT_TITLE.to_string(),
            message: format!("This website may steal your data:\n{url}"),
            url: url.to_string(),
            detected_at,
        }
    }
}

impl UiUpdate {
    pub fn derive(url: &str, label: &ClassificationLabel) -> Self {
        Self {
            badge: BadgeState::for_label(label),
            alert: label.is_phishing().then(|| Alert::phishing(url, Utc::now())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phishing_raises_badge_and_alert() {
        let update = UiUpdate::derive("https://bank-example.com", &ClassificationLabel::Phishing);
        assert_eq!(update.badge.text, "!");
        assert_eq!(update.badge.color, "#d93025");
        let alert = update.alert.expect("phishing must alert");
        assert_eq!(alert.title, ALERT_TITLE);
        assert!(alert.message.contains("https://bank-example.com"));
    }

    #[test]
    fn legitimate_is_quiet() {
        let update = UiUpdate::derive("https://example.com", &ClassificationLabel::Legitimate);
        assert_eq!(update.badge, BadgeState { text: "OK", color: "#188038" });
        assert!(update.alert.is_none());
    }

    #[test]
    fn unknown_and_other_labels_are_neutral() {
        for label in [
            ClassificationLabel::Unknown,
            ClassificationLabel::Other("suspicious".to_string()),
        ] {
            let update = UiUpdate::derive("https://example.com", &label);
            assert_eq!(update.badge, BadgeState { text: "?", color: "#888" });
            assert!(update.alert.is_none());
        }
    }
}
