use docflow_core::util::decode_lossy;
use docflow_core::{ExtractionResult, LLMProvider, Urgency};
use std::sync::Arc;
use tracing::info;

use super::fallback::{email_entities, from_header};
use super::strategy::{EntitySchema, extract_entities};
use crate::settings::ExtractionSettings;

/// Keyword tiers, checked in order; the first tier with a hit wins.
const URGENCY_TIERS: [(Urgency, &[&str]); 3] = [
    (
        Urgency::High,
        &["urgent", "critical", "immediate", "asap", "emergency"],
    ),
    (
        Urgency::Medium,
        &["important", "attention", "priority", "needed"],
    ),
    (Urgency::Low, &["fyi", "update", "information"]),
];

/// Keyword-based urgency; `MEDIUM` when nothing matches.
#[must_use]
pub fn detect_urgency(text: &str) -> Urgency {
    let lower = text.to_lowercase();
    URGENCY_TIERS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(Urgency::Medium, |(level, _)| *level)
}

/// Fixed schema for customer correspondence.
pub struct EmailSchema {
    preview_chars: usize,
}

impl EmailSchema {
    #[must_use]
    pub const fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }
}

impl EntitySchema for EmailSchema {
    fn name(&self) -> &'static str {
        "email"
    }

    fn prompt(&self, text: &str) -> String {
        format!(
            "Extract key entities from this email in a structured format:\n\
{text}\n\n\
Analyze the content carefully and extract ALL of the following that apply:\n\
- sender_name: The name of the person sending the email\n\
- sender_company: The company the sender represents\n\
- product_name: Any products mentioned\n\
- quantity: Any quantities mentioned (as numbers)\n\
- issue_description: Description of any problems or issues\n\
- deadline: Any mentioned deadlines or dates\n\
- urgency_indicators: Words indicating urgency (like 'urgent', 'asap', etc.)\n\
- requested_action: What action is being requested\n\n\
Return ONLY a valid JSON object with these fields. If a field is not applicable, use null or omit it."
        )
    }

    fn fallback(&self, text: &str) -> ExtractionResult {
        email_entities(text, self.preview_chars)
    }
}

/// Handles emails and any other plain text.
pub struct EmailExtractor {
    provider: Arc<dyn LLMProvider>,
    schema: EmailSchema,
    max_attempts: usize,
}

impl EmailExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: &ExtractionSettings) -> Self {
        Self {
            provider,
            schema: EmailSchema::new(settings.preview_chars),
            max_attempts: settings.max_attempts,
        }
    }

    /// `{sender, urgency, entities}` for the given body.
    pub async fn process(&self, content: &[u8]) -> ExtractionResult {
        let text = decode_lossy(content);

        let sender = from_header(&text).unwrap_or_else(|| "Unknown".to_string());
        let urgency = detect_urgency(&text);
        info!("Email from {} with urgency {}", sender, urgency);

        let entities =
            extract_entities(self.provider.as_ref(), &self.schema, &text, self.max_attempts).await;

        ExtractionResult::new()
            .with("sender", sender)
            .with("urgency", urgency)
            .with("entities", entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_providers::ScriptedProvider;
    use serde_json::{Value, json};

    #[test]
    fn high_tier_wins_over_lower_tiers() {
        assert_eq!(detect_urgency("URGENT: action needed"), Urgency::High);
        assert_eq!(detect_urgency("fyi, this is important"), Urgency::Medium);
        assert_eq!(detect_urgency("Quick update on the shipment"), Urgency::Low);
        assert_eq!(detect_urgency("Hello"), Urgency::Medium);
    }

    #[test]
    fn keywords_match_inside_words() {
        // substring semantics: "updated" contains "update"
        assert_eq!(detect_urgency("The file was updated"), Urgency::Low);
    }

    #[tokio::test]
    async fn model_entities_are_returned_verbatim() {
        let provider = Arc::new(ScriptedProvider::new([
            r#"```json
{"sender_name": "Dana", "quantity": 40, "requested_action": "replace"}
```"#,
        ]));
        let extractor = EmailExtractor::new(provider, &ExtractionSettings::default());

        let result = extractor
            .process(b"From: dana@northwind.example\nSubject: Broken hinge\n\nPlease replace asap.")
            .await;

        assert_eq!(
            Value::from(result),
            json!({
                "sender": "dana@northwind.example",
                "urgency": "HIGH",
                "entities": {"sender_name": "Dana", "quantity": 40, "requested_action": "replace"},
            })
        );
    }

    #[tokio::test]
    async fn missing_sender_defaults_to_unknown() {
        let provider = Arc::new(ScriptedProvider::repeating("{}"));
        let extractor = EmailExtractor::new(provider, &ExtractionSettings::default());
        let result = extractor.process(b"just some text").await;
        assert_eq!(result.get("sender"), Some(&json!("Unknown")));
        assert_eq!(result.get("urgency"), Some(&json!("MEDIUM")));
    }

    #[tokio::test]
    async fn three_bad_replies_fall_back_to_patterns() {
        let provider = Arc::new(ScriptedProvider::repeating("Sorry, I can't help with that."));
        let extractor = EmailExtractor::new(provider.clone(), &ExtractionSettings::default());

        let result = extractor
            .process(b"From: ops@example.com\nSubject: Order\n\nSend 5 items by 2024-05-01.")
            .await;

        assert_eq!(provider.call_count(), 3);
        assert_eq!(
            result.get("entities"),
            Some(&json!({
                "sender": "ops@example.com",
                "subject": "Order",
                "quantities": ["5 items"],
                "dates": ["2024-05-01"],
                "content_preview": "From: ops@example.com\nSubject: Order\n\nSend 5 items by 2024-05-01.",
            }))
        );
    }
}
