use docflow_core::util::truncate_chars;
use docflow_core::{ExtractionResult, LLMProvider, Urgency};
use lopdf::Document;
use std::sync::Arc;
use tracing::{info, warn};

use super::fallback::{from_header, invoice_entities, vendor_header};
use super::strategy::{EntitySchema, extract_entities};
use crate::settings::ExtractionSettings;

fn try_pdf_to_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let doc = Document::load_mem(bytes)?;
    let mut text = String::new();

    for page_number in doc.get_pages().keys() {
        // lopdf already terminates page text with line breaks; keep exactly one
        let page = doc.extract_text(&[*page_number])?;
        text.push_str(page.trim_end_matches(['\r', '\n']));
        text.push('\n');
    }

    Ok(text)
}

/// Text of every page, one newline after each.
///
/// Never fails: a document that cannot be read turns into a text describing
/// the error, which then goes through extraction like any other content.
#[must_use]
pub fn pdf_to_text(bytes: &[u8]) -> String {
    try_pdf_to_text(bytes).unwrap_or_else(|e| {
        warn!("PDF text extraction failed: {e}");
        format!("Error extracting PDF text: {e}")
    })
}

/// Fixed invoice schema, prompted with the head of the document only.
pub struct InvoiceSchema {
    context_chars: usize,
    preview_chars: usize,
}

impl InvoiceSchema {
    #[must_use]
    pub const fn new(context_chars: usize, preview_chars: usize) -> Self {
        Self {
            context_chars,
            preview_chars,
        }
    }
}

impl EntitySchema for InvoiceSchema {
    fn name(&self) -> &'static str {
        "invoice"
    }

    fn prompt(&self, text: &str) -> String {
        let head = truncate_chars(text, self.context_chars);
        format!(
            "Extract key information from this document text in a structured format:\n\
{head}\n\n\
Analyze the content carefully and extract ALL of the following that apply:\n\
- invoice_number: Any invoice or reference numbers\n\
- vendor_name: The company issuing the document\n\
- client_name: The company receiving the document\n\
- total_amount: The total monetary amount (as a number without currency symbols)\n\
- line_items: Array of items with quantities and prices\n\
- payment_terms: Payment terms if mentioned\n\
- issue_date: When the document was issued\n\
- due_date: When payment or action is due\n\n\
Return ONLY a valid JSON object with these fields. If a field is not applicable, use null or omit it."
        )
    }

    fn fallback(&self, text: &str) -> ExtractionResult {
        invoice_entities(text, self.preview_chars)
    }
}

pub struct PdfExtractor {
    provider: Arc<dyn LLMProvider>,
    schema: InvoiceSchema,
    max_attempts: usize,
}

impl PdfExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: &ExtractionSettings) -> Self {
        Self {
            provider,
            schema: InvoiceSchema::new(settings.pdf_context_chars, settings.preview_chars),
            max_attempts: settings.max_attempts,
        }
    }

    /// `{sender, urgency, entities}`; urgency is always `MEDIUM` for PDFs.
    pub async fn process(&self, content: &[u8]) -> ExtractionResult {
        let text = pdf_to_text(content);
        info!("Extracted {} characters of PDF text", text.chars().count());

        let sender = vendor_header(&text)
            .or_else(|| from_header(&text))
            .unwrap_or_else(|| "Unknown".to_string());

        let entities =
            extract_entities(self.provider.as_ref(), &self.schema, &text, self.max_attempts).await;

        ExtractionResult::new()
            .with("sender", sender)
            .with("urgency", Urgency::Medium)
            .with("entities", entities)
    }
}
