use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict the prediction service gave for a URL.
///
/// `Unknown` doubles as the "no entry" sentinel returned by cache lookups.
/// Labels outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClassificationLabel {
    Phishing,
    Legitimate,
    #[default]
    Unknown,
    Other(String),
}

impl ClassificationLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ClassificationLabel::Phishing => "phishing",
            ClassificationLabel::Legitimate => "legitimate",
            ClassificationLabel::Unknown => "unknown",
            ClassificationLabel::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, ClassificationLabel::Phishing)
    }
}

impl From<&str> for ClassificationLabel {
    fn from(raw: &str) -> Self {
        match raw {
            "" | "unknown" => ClassificationLabel::Unknown,
            "phishing" => ClassificationLabel::Phishing,
            "legitimate" => ClassificationLabel::Legitimate,
            other => ClassificationLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for ClassificationLabel {
    fn from(raw: String) -> Self {
        ClassificationLabel::from(raw.as_str())
    }
}

impl From<ClassificationLabel> for String {
    fn from(label: ClassificationLabel) -> Self {
        match label {
            ClassificationLabel::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
