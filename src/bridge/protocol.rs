use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{LoadStatus, PageEvent},
    status::StatusReport,
    ui::{Alert, BadgeState},
};

/// One line of input from the extension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    PageLoaded {
        #[serde(default)]
        url: Option<String>,
        #[serde(default = "unreported_status")]
        status: LoadStatus,
    },
    TabActivated {
        #[serde(default)]
        url: Option<String>,
    },
    GetResult {
        url: String,
    },
}

/// One line of output to the extension.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Badge(BadgeState),
    Alert(Alert),
    Result(StatusReport),
}

fn unreported_status() -> LoadStatus {
    LoadStatus::Other
}

impl Inbound {
    pub fn into_event(self) -> Option<PageEvent> {
        match self {
            Inbound::PageLoaded { url, status } => Some(PageEvent::PageLoaded { url, status }),
            Inbound::TabActivated { url } => Some(PageEvent::ActivePageSwitched { url }),
            Inbound::GetResult { .. } => None,
        }
    }
}

pub fn parse_line(line: &str) -> Result<Inbound> {
    serde_json::from_str(line).with_context(|| format!("unrecognised bridge message: {line}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ClassificationLabel, status::StatusReader};

    #[test]
    fn parses_page_loaded() {
        let msg = parse_line(r#"{"type":"page_loaded","url":"https://a.test","status":"complete"}"#)
            .unwrap();
        assert_eq!(
            msg.into_event(),
            Some(PageEvent::PageLoaded {
                url: Some("https://a.test".to_string()),
                status: LoadStatus::Complete,
            })
        );
    }

    #[test]
    fn unfamiliar_or_missing_status_is_not_complete() {
        let msg = parse_line(r#"{"type":"page_loaded","url":"https://a.test","status":"unloaded"}"#)
            .unwrap();
        assert!(matches!(msg, Inbound::PageLoaded { status: LoadStatus::Other, .. }));

        let msg = parse_line(r#"{"type":"page_loaded","url":"https://a.test"}"#).unwrap();
        assert!(matches!(msg, Inbound::PageLoaded { status: LoadStatus::Other, .. }));
    }

    #[test]
    fn tab_without_url_parses() {
        let msg = parse_line(r#"{"type":"tab_activated","url":null}"#).unwrap();
        assert_eq!(msg, Inbound::TabActivated { url: None });
    }

    #[test]
    fn query_is_not_an_event() {
        let msg = parse_line(r#"{"type":"get_result","url":"https://a.test"}"#).unwrap();
        assert_eq!(msg.into_event(), None);
    }

    #[test]
    fn rejects_unknown_types_and_garbage() {
        assert!(parse_line(r#"{"type":"reload"}"#).is_err());
        assert!(parse_line("not json").is_err());
    }

    #[test]
    fn outbound_messages_are_tagged() {
        let badge = serde_json::to_value(Outbound::Badge(BadgeState {
            text: "OK",
            color: "#188038",
        }))
        .unwrap();
        assert_eq!(
            badge,
            serde_json::json!({ "type": "badge", "text": "OK", "color": "#188038" })
        );

        let reader = StatusReader::new(Default::default());
        let result = serde_json::to_value(Outbound::Result(reader.query("https://a.test"))).unwrap();
        assert_eq!(result["type"], "result");
        assert_eq!(result["label"], ClassificationLabel::Unknown.as_str());
        assert_eq!(result["view"]["class"], "neutral");
    }
}
