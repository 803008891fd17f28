use async_trait::async_trait;
use docflow_core::{LLMProvider, LLMResponse, Usage};
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::info;

use crate::retry::{RetryPolicy, retry_with_backoff_if};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Google Gemini `generateContent` client.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating GeminiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &serde_json::Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let content = parse_candidate_text(&response)
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?;

        let usage = response["usageMetadata"].as_object().map(|u| Usage {
            prompt_tokens: token_count(u.get("promptTokenCount")),
            completion_tokens: token_count(u.get("candidatesTokenCount")),
            total_tokens: token_count(u.get("totalTokenCount")),
        });

        Ok(LLMResponse { content, usage })
    }
}

/// Concatenated text parts of the first candidate.
fn parse_candidate_text(response: &serde_json::Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    Some(text)
}

/// Whether a failed request is worth repeating: connection problems,
/// timeouts, rate limiting and server errors. Other client errors (bad key,
/// bad request) and malformed bodies fail the same way every time.
fn is_transient(err: &anyhow::Error) -> bool {
    let Some(err) = err.downcast_ref::<reqwest::Error>() else {
        return false;
    };

    match err.status() {
        Some(status) => status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
        None => err.is_connect() || err.is_timeout() || err.is_request(),
    }
}

fn token_count(value: Option<&serde_json::Value>) -> u32 {
    value
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_content(&self, prompt: &str) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        });

        info!("Sending request to Gemini API: model={}", self.model);

        let response =
            retry_with_backoff_if(|| self.try_send(&request), &self.retry, is_transient).await?;

        if let Some(usage) = &response.usage {
            info!(
                "Received response from Gemini API: {} prompt / {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        } else {
            info!("Received response from Gemini API");
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return Ok(());
                }
            }
        }
    }

    /// Answers the n-th request with `responses[n]`, repeating the last one.
    async fn serve(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let response = responses[index.min(responses.len() - 1)].clone();
                tokio::spawn(async move {
                    if read_request(&mut stream).await.is_ok() {
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                });
            }
        });

        (format!("http://{addr}/v1beta"), hits)
    }

    fn provider_for(base_url: String) -> GeminiProvider {
        GeminiProvider::new("test-key".to_string())
            .with_base_url(base_url)
            .with_retry_policy(RetryPolicy {
                base_delays_secs: vec![0, 0, 0],
                final_retries: 0,
                final_delay_secs: 0,
            })
    }

    #[tokio::test]
    async fn unauthorized_is_not_retried() {
        let (base_url, hits) = serve(vec![http_response(
            "401 Unauthorized",
            r#"{"error": {"code": 401}}"#,
        )])
        .await;

        let result = provider_for(base_url).generate_content("classify me").await;

        assert!(result.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_request_is_not_retried() {
        let (base_url, hits) = serve(vec![http_response("400 Bad Request", "{}")]).await;

        assert!(provider_for(base_url).generate_content("p").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let ok_body = r#"{"candidates": [{"content": {"parts": [{"text": "Invoice"}]}}]}"#;
        let (base_url, hits) = serve(vec![
            http_response("503 Service Unavailable", "{}"),
            http_response("429 Too Many Requests", "{}"),
            http_response("200 OK", ok_body),
        ])
        .await;

        let response = provider_for(base_url).generate_content("p").await.unwrap();

        assert_eq!(response.content, "Invoice");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn non_http_errors_are_permanent() {
        assert!(!is_transient(&anyhow::anyhow!(
            "Invalid response format: missing content"
        )));
    }

    #[test]
    fn endpoint_includes_model() {
        let provider = GeminiProvider::new("key".to_string())
            .with_base_url("http://localhost:8080/v1beta/".to_string())
            .with_model("gemini-test".to_string());
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(provider.model_name(), "gemini-test");
    }

    #[test]
    fn candidate_text_joins_parts() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Invo" }, { "text": "ice" }] }
            }]
        });
        assert_eq!(parse_candidate_text(&response).as_deref(), Some("Invoice"));
    }

    #[test]
    fn missing_candidates_yield_none() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(parse_candidate_text(&response).is_none());
    }

    #[test]
    fn token_count_tolerates_missing_values() {
        assert_eq!(token_count(None), 0);
        assert_eq!(token_count(Some(&json!(42))), 42);
        assert_eq!(token_count(Some(&json!("x"))), 0);
    }
}
