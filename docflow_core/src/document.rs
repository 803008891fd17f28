//! Document-level data model shared by the pipeline and the stores.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp layout used in stored records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "PDF")]
    Pdf,
    Email,
    Text,
}

impl DocumentFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Pdf => "PDF",
            Self::Email => "Email",
            Self::Text => "Text",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JSON" => Ok(Self::Json),
            "PDF" => Ok(Self::Pdf),
            "Email" => Ok(Self::Email),
            "Text" => Ok(Self::Text),
            _ => Err(anyhow::anyhow!("unknown document format: {s}")),
        }
    }
}

/// Format and business intent of one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    format: DocumentFormat,
    intent: String,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(format: DocumentFormat, intent: impl Into<String>) -> Self {
        Self {
            format,
            intent: intent.into(),
        }
    }

    #[must_use]
    pub const fn format(&self) -> DocumentFormat {
        self.format
    }

    #[must_use]
    pub fn intent(&self) -> &str {
        &self.intent
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Urgency> for Value {
    fn from(urgency: Urgency) -> Self {
        Self::String(urgency.as_str().to_string())
    }
}

/// Field mapping produced by an extractor.
///
/// Always a JSON object, including on error paths where it carries
/// `status`/`message` instead of extracted fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ExtractionResult(Map<String, Value>);

impl ExtractionResult {
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// `{status: "error", message}` payload.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new()
            .with("status", "error")
            .with("message", message.into())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get("status").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status() == Some("error")
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ExtractionResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ExtractionResult> for Value {
    fn from(result: ExtractionResult) -> Self {
        Self::Object(result.0)
    }
}

/// A processed document as persisted by a [`crate::DocumentStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub source: String,
    pub format: DocumentFormat,
    pub intent: String,
    #[serde(with = "timestamp_serde")]
    pub timestamp: NaiveDateTime,
    /// An object for every record this crate writes; a bare string only when
    /// a persisted payload could not be parsed back.
    pub extracted_data: Value,
}

impl DocumentRecord {
    /// Create a record stamped with the current local time (second precision).
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        format: DocumentFormat,
        intent: impl Into<String>,
        extracted_data: ExtractionResult,
    ) -> Self {
        let now = Local::now().naive_local();
        Self {
            source: source.into(),
            format,
            intent: intent.into(),
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            extracted_data: extracted_data.into(),
        }
    }

    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

mod timestamp_serde {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Classification plus extraction for one document, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub classification: ClassificationResult,
    pub result: ExtractionResult,
}

impl ProcessedDocument {
    /// Caller-facing record: `format` and `intent` merged with the extractor's
    /// fields. Extractor keys win on collision.
    #[must_use]
    pub fn to_output(&self) -> Map<String, Value> {
        let mut output = Map::new();
        output.insert(
            "format".to_string(),
            Value::String(self.classification.format().to_string()),
        );
        output.insert(
            "intent".to_string(),
            Value::String(self.classification.intent().to_string()),
        );
        for (key, value) in self.result.as_map() {
            output.insert(key.clone(), value.clone());
        }
        output
    }
}
