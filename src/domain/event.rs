use serde::Deserialize;

/// Load status reported alongside a "page finished loading" trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    Complete,
    #[serde(other)]
    Other,
}

/// Navigation signal coming from the browser side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    PageLoaded {
        url: Option<String>,
        status: LoadStatus,
    },
    ActivePageSwitched {
        url: Option<String>,
    },
}

impl PageEvent {
    pub fn url(&self) -> Option<&str> {
        match self {
            PageEvent::PageLoaded { url, .. } | PageEvent::ActivePageSwitched { url } => {
                url.as_deref()
            }
        }
    }
}
