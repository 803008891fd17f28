//! A processing session: one conversation id plus the documents handled
//! under it.

use chrono::NaiveDateTime;
use docflow_core::{ClassificationResult, DocumentRecord, ExtractionResult, ProcessedDocument};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::pipeline::DocumentPipeline;

/// One processed document, as remembered by the session. The timestamp is
/// the one written to the store.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: NaiveDateTime,
    pub file: String,
    pub classification: ClassificationResult,
    pub result: ExtractionResult,
}

pub struct DocumentSession {
    id: Uuid,
    pipeline: Arc<DocumentPipeline>,
    history: Vec<HistoryEntry>,
}

impl DocumentSession {
    /// Start a session under a fresh conversation id.
    #[must_use]
    pub fn new(pipeline: Arc<DocumentPipeline>) -> Self {
        Self::resume(pipeline, docflow_core::new_conversation_id())
    }

    /// Continue writing under an existing conversation id. The in-process
    /// history starts empty.
    #[must_use]
    pub const fn resume(pipeline: Arc<DocumentPipeline>, id: Uuid) -> Self {
        Self {
            id,
            pipeline,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub async fn process_bytes(
        &mut self,
        file_name: &str,
        content: &[u8],
    ) -> anyhow::Result<ProcessedDocument> {
        let (processed, record) = self
            .pipeline
            .process_with_record(&self.id, file_name, content)
            .await?;

        self.history.push(HistoryEntry {
            timestamp: record.timestamp,
            file: file_name.to_string(),
            classification: processed.classification.clone(),
            result: processed.result.clone(),
        });

        Ok(processed)
    }

    /// Read a file from disk and process it under its base name.
    pub async fn process_file(&mut self, path: &Path) -> anyhow::Result<ProcessedDocument> {
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.process_bytes(&file_name, &content).await
    }

    /// The record the store currently holds for this conversation.
    pub async fn stored_record(&self) -> anyhow::Result<Option<DocumentRecord>> {
        self.pipeline.store().get(&self.id).await
    }
}
