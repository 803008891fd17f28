use docflow_core::{ExtractionResult, LLMProvider};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, warn};

use super::strategy::request_structured;
use crate::settings::ExtractionSettings;

const RFQ_DOCUMENT_TYPE: &str = "Request for Quote";
const RFQ_FIELDS: [&str; 3] = ["product", "quantity", "deadline"];

/// Fixed-schema extraction for request-for-quote objects.
///
/// The only anomaly check in the pipeline: a missing `budget_range`.
fn process_rfq(data: &Map<String, Value>) -> ExtractionResult {
    let fields: Map<String, Value> = RFQ_FIELDS
        .iter()
        .map(|&name| (name.to_string(), data.get(name).cloned().unwrap_or(Value::Null)))
        .collect();

    let mut anomalies = Vec::new();
    if !data.contains_key("budget_range") {
        anomalies.push("Missing: budget_range");
    }

    ExtractionResult::new()
        .with("status", "processed")
        .with("intent", "RFQ")
        .with("fields", fields)
        .with("anomalies", anomalies)
}

fn generic_prompt(data: &Value) -> String {
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    format!(
        "Extract the most important fields from this JSON document:\n\
{pretty}\n\n\
Return a JSON object with:\n\
1. The key fields and their values\n\
2. Any anomalies or missing fields that would be expected"
    )
}

/// Returned when the model never produced a usable object.
fn generic_fallback(data: Value) -> ExtractionResult {
    ExtractionResult::new()
        .with("status", "processed")
        .with("fields", data)
        .with("anomalies", json!(["Unable to determine expected fields"]))
}

fn is_rfq(data: &Value) -> Option<&Map<String, Value>> {
    let object = data.as_object()?;
    (object.get("document_type").and_then(Value::as_str) == Some(RFQ_DOCUMENT_TYPE))
        .then_some(object)
}

pub struct JsonExtractor {
    provider: Arc<dyn LLMProvider>,
    max_attempts: usize,
}

impl JsonExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: &ExtractionSettings) -> Self {
        Self {
            provider,
            max_attempts: settings.max_attempts,
        }
    }

    /// Parse and extract. Unparseable input is a terminal error payload.
    pub async fn process(&self, content: &[u8]) -> ExtractionResult {
        let data: Value = match serde_json::from_slice(content) {
            Ok(data) => data,
            Err(e) => {
                warn!("Rejecting JSON document: {e}");
                return ExtractionResult::error("Invalid JSON format");
            }
        };

        if let Some(rfq) = is_rfq(&data) {
            info!("Request for Quote document, using fixed schema");
            return process_rfq(rfq);
        }

        let prompt = generic_prompt(&data);
        match request_structured(self.provider.as_ref(), &prompt, self.max_attempts).await {
            Some(map) => ExtractionResult::from(map),
            None => {
                info!("Falling back to raw fields for generic JSON document");
                generic_fallback(data)
            }
        }
    }
}
