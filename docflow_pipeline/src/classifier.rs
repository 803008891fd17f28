use docflow_core::util::{decode_lossy, truncate_chars};
use docflow_core::{ClassificationResult, DocumentFormat, LLMProvider};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::settings::ExtractionSettings;

/// Intent used when the model could not be reached.
const UNKNOWN_INTENT: &str = "Unknown";

/// Lower-cased model answers and their canonical intent.
const INTENT_ALIASES: [(&str, &str); 6] = [
    ("request for quote", "RFQ"),
    ("request for quotation", "RFQ"),
    ("rfq", "RFQ"),
    ("invoice", "Invoice"),
    ("complaint", "Complaint"),
    ("regulation", "Regulation"),
];

static EMAIL_HEADER: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn email_header() -> &'static Regex {
    EMAIL_HEADER.get_or_init(|| {
        Regex::new(r"From:\s|Subject:\s|Date:\s")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

/// Whether the text carries any `From:`, `Subject:` or `Date:` header marker.
#[must_use]
pub fn looks_like_email(text: &str) -> bool {
    email_header().is_match(text)
}

/// Format from the file name suffix, then from content sniffing.
#[must_use]
pub fn detect_format(file_name: &str, content: &[u8]) -> DocumentFormat {
    if file_name.ends_with(".json") {
        DocumentFormat::Json
    } else if file_name.ends_with(".pdf") {
        DocumentFormat::Pdf
    } else if file_name.ends_with(".txt") || looks_like_email(&decode_lossy(content)) {
        DocumentFormat::Email
    } else {
        DocumentFormat::Text
    }
}

/// Canonical spelling for known intents; anything else passes through trimmed.
#[must_use]
pub fn normalize_intent(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    INTENT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map_or_else(|| trimmed.to_string(), |(_, canonical)| (*canonical).to_string())
}

fn intent_prompt(text: &str, format: DocumentFormat) -> String {
    format!(
        "Analyze the following document and determine its intent.\n\
Possible intents include: Invoice, RFQ (Request for Quote), Complaint, Regulation, etc.\n\n\
Document content (format: {format}):\n\
{text}\n\n\
Return only the intent as a single word or short phrase."
    )
}

/// Format sniffing plus a single, unretried intent prompt.
pub struct Classifier {
    provider: Arc<dyn LLMProvider>,
    context_chars: usize,
}

impl Classifier {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: &ExtractionSettings) -> Self {
        Self {
            provider,
            context_chars: settings.intent_context_chars,
        }
    }

    pub async fn classify(&self, content: &[u8], file_name: &str) -> ClassificationResult {
        let format = detect_format(file_name, content);
        let intent = self.detect_intent(content, format).await;
        info!("Classified {} as {} / {}", file_name, format, intent);
        ClassificationResult::new(format, intent)
    }

    async fn detect_intent(&self, content: &[u8], format: DocumentFormat) -> String {
        let text = decode_lossy(content);
        let prompt = intent_prompt(truncate_chars(&text, self.context_chars), format);

        match self.provider.generate_content(&prompt).await {
            Ok(response) => normalize_intent(&response.content),
            Err(e) => {
                warn!("Intent detection failed: {e}");
                UNKNOWN_INTENT.to_string()
            }
        }
    }
}
