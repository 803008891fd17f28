#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

pub mod document;
pub mod response;
pub mod util;

pub use document::{
    ClassificationResult, DocumentFormat, DocumentRecord, ExtractionResult, ProcessedDocument,
    TIMESTAMP_FORMAT, Urgency,
};
pub use response::{ResponseParseError, parse_structured_response, strip_code_fences};

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One-shot text generation.
///
/// Implementations own their transport concerns (auth, backoff); callers only
/// see a prompt going in and text coming out.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> anyhow::Result<LLMResponse>;
    fn model_name(&self) -> &str;
}

/// Key-value persistence for processed documents, addressed by conversation id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write the record under `doc:<conversation_id>`, replacing any previous one.
    async fn put(&self, conversation_id: &Uuid, record: &DocumentRecord) -> anyhow::Result<()>;

    async fn get(&self, conversation_id: &Uuid) -> anyhow::Result<Option<DocumentRecord>>;

    /// All stored document keys.
    async fn list_documents(&self) -> anyhow::Result<Vec<String>>;

    /// Human-readable backend label.
    fn backend_name(&self) -> &'static str;

    /// Build a timestamped record from the pipeline outputs and persist it.
    async fn store(
        &self,
        conversation_id: &Uuid,
        source: &str,
        format: DocumentFormat,
        intent: &str,
        extracted_data: &ExtractionResult,
    ) -> anyhow::Result<DocumentRecord> {
        let record = DocumentRecord::new(source, format, intent, extracted_data.clone());
        debug!(
            "Writing {} ({} / {}) to {}",
            document_key(conversation_id),
            format,
            intent,
            self.backend_name()
        );
        self.put(conversation_id, &record).await?;
        Ok(record)
    }
}

/// Storage key for a conversation's document record.
#[must_use]
pub fn document_key(conversation_id: &Uuid) -> String {
    format!("doc:{conversation_id}")
}

/// Fresh conversation identifier for a new session.
#[must_use]
pub fn new_conversation_id() -> Uuid {
    Uuid::now_v7()
}
