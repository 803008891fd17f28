//! Two-stage entity extraction.
//!
//! Stage one asks the model for a JSON object, up to `max_attempts` times,
//! tightening the instructions after every unusable reply. Stage two is a
//! pure pattern extraction that always succeeds. The stages are separate
//! functions so either can be exercised on its own.

use docflow_core::{ExtractionResult, LLMProvider, parse_structured_response};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Appended to the prompt before each retry. Reminders accumulate, so every
/// retry carries one more than the attempt before it.
pub const STRICTNESS_REMINDER: &str =
    "IMPORTANT: Return ONLY a valid JSON object with no additional text.";

/// A fixed extraction schema: how to ask for it and how to approximate it
/// without the model.
pub trait EntitySchema: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn prompt(&self, text: &str) -> String;

    fn fallback(&self, text: &str) -> ExtractionResult;
}

/// Stage one: ask until a reply parses as a JSON object.
///
/// Transport failures count as attempts. `None` once all attempts are spent;
/// `max_attempts == 0` skips the model entirely.
pub async fn request_structured(
    provider: &dyn LLMProvider,
    base_prompt: &str,
    max_attempts: usize,
) -> Option<Map<String, Value>> {
    let mut prompt = base_prompt.to_string();

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            prompt.push_str("\n\n");
            prompt.push_str(STRICTNESS_REMINDER);
        }

        match provider.generate_content(&prompt).await {
            Ok(response) => match parse_structured_response(&response.content) {
                Ok(map) => {
                    debug!("Structured reply on attempt {}/{}", attempt, max_attempts);
                    return Some(map);
                }
                Err(e) => warn!("Attempt {}/{}: unusable model reply: {e}", attempt, max_attempts),
            },
            Err(e) => warn!("Attempt {}/{}: model call failed: {e}", attempt, max_attempts),
        }
    }

    None
}

/// Both stages against `schema`.
pub async fn extract_entities(
    provider: &dyn LLMProvider,
    schema: &dyn EntitySchema,
    text: &str,
    max_attempts: usize,
) -> ExtractionResult {
    let prompt = schema.prompt(text);
    match request_structured(provider, &prompt, max_attempts).await {
        Some(map) => ExtractionResult::from(map),
        None => {
            info!("Falling back to pattern extraction for {} entities", schema.name());
            schema.fallback(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_providers::ScriptedProvider;
    use serde_json::json;

    struct EchoSchema;

    impl EntitySchema for EchoSchema {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn prompt(&self, text: &str) -> String {
            format!("Extract from: {text}")
        }

        fn fallback(&self, text: &str) -> ExtractionResult {
            ExtractionResult::new().with("fallback", text)
        }
    }

    #[tokio::test]
    async fn first_parseable_reply_wins() {
        let provider = ScriptedProvider::new(["```json\n{\"a\": 1}\n```"]);
        let map = request_structured(&provider, "p", 3).await.unwrap();
        assert_eq!(Value::Object(map), json!({"a": 1}));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn retries_tighten_the_prompt() {
        let provider = ScriptedProvider::new(["sure!", "here it is: {", "{\"ok\": true}"]);
        let map = request_structured(&provider, "base", 3).await.unwrap();
        assert_eq!(map["ok"], json!(true));

        let prompts = provider.prompts();
        assert_eq!(prompts[0], "base");
        assert_eq!(prompts[1], format!("base\n\n{STRICTNESS_REMINDER}"));
        assert_eq!(
            prompts[2],
            format!("base\n\n{STRICTNESS_REMINDER}\n\n{STRICTNESS_REMINDER}")
        );
        assert_eq!(
            STRICTNESS_REMINDER,
            "IMPORTANT: Return ONLY a valid JSON object with no additional text."
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let provider = ScriptedProvider::repeating("not json");
        assert!(request_structured(&provider, "p", 3).await.is_none());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn transport_errors_count_as_attempts() {
        let provider = ScriptedProvider::new(Vec::<String>::new())
            .then_fail("timeout")
            .then_fail("timeout");
        assert!(request_structured(&provider, "p", 2).await.is_none());
        assert_eq!(provider.call_count(), 2);

        let provider = ScriptedProvider::new(Vec::<String>::new())
            .then_fail("reset")
            .then_reply("{\"a\": 1}");
        assert!(request_structured(&provider, "p", 3).await.is_some());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn arrays_are_not_accepted() {
        let provider = ScriptedProvider::repeating("[{\"a\": 1}]");
        assert!(request_structured(&provider, "p", 2).await.is_none());
    }

    #[tokio::test]
    async fn zero_attempts_go_straight_to_fallback() {
        let provider = ScriptedProvider::repeating("{\"a\": 1}");
        let result = extract_entities(&provider, &EchoSchema, "body", 0).await;
        assert_eq!(result.get("fallback"), Some(&json!("body")));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn fallback_after_exhaustion() {
        let provider = ScriptedProvider::repeating("no");
        let result = extract_entities(&provider, &EchoSchema, "body", 3).await;
        assert_eq!(Value::from(result), json!({"fallback": "body"}));
        assert_eq!(provider.prompts()[0], "Extract from: body");
    }
}
