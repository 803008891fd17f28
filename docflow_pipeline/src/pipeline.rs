use docflow_core::{
    ClassificationResult, DocumentFormat, DocumentRecord, DocumentStore, ExtractionResult,
    LLMProvider, ProcessedDocument,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::extraction::email::EmailExtractor;
use crate::extraction::json::JsonExtractor;
use crate::extraction::pdf::PdfExtractor;
use crate::settings::ExtractionSettings;

/// classify → extract → store, for one document at a time.
pub struct DocumentPipeline {
    classifier: Classifier,
    json: JsonExtractor,
    email: EmailExtractor,
    pdf: PdfExtractor,
    store: Arc<dyn DocumentStore>,
}

impl DocumentPipeline {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        store: Arc<dyn DocumentStore>,
        settings: &ExtractionSettings,
    ) -> Self {
        Self {
            classifier: Classifier::new(provider.clone(), settings),
            json: JsonExtractor::new(provider.clone(), settings),
            email: EmailExtractor::new(provider.clone(), settings),
            pdf: PdfExtractor::new(provider, settings),
            store,
        }
    }

    pub async fn classify(&self, content: &[u8], file_name: &str) -> ClassificationResult {
        self.classifier.classify(content, file_name).await
    }

    /// Route to the extractor for the classified format. Plain text goes
    /// through the email extractor.
    pub async fn extract(
        &self,
        classification: &ClassificationResult,
        content: &[u8],
    ) -> ExtractionResult {
        match classification.format() {
            DocumentFormat::Json => self.json.process(content).await,
            DocumentFormat::Pdf => self.pdf.process(content).await,
            DocumentFormat::Email | DocumentFormat::Text => self.email.process(content).await,
        }
    }

    /// Run all stages and write the record once extraction has finished.
    pub async fn process(
        &self,
        conversation_id: &Uuid,
        file_name: &str,
        content: &[u8],
    ) -> anyhow::Result<ProcessedDocument> {
        let (processed, _) = self
            .process_with_record(conversation_id, file_name, content)
            .await?;
        Ok(processed)
    }

    /// Like [`Self::process`], also returning the record exactly as written.
    pub async fn process_with_record(
        &self,
        conversation_id: &Uuid,
        file_name: &str,
        content: &[u8],
    ) -> anyhow::Result<(ProcessedDocument, DocumentRecord)> {
        let classification = self.classify(content, file_name).await;
        let result = self.extract(&classification, content).await;

        let record = self
            .store
            .store(
                conversation_id,
                file_name,
                classification.format(),
                classification.intent(),
                &result,
            )
            .await?;
        info!(
            "Stored {} for conversation {} in {}",
            file_name,
            conversation_id,
            self.store.backend_name()
        );

        Ok((
            ProcessedDocument {
                classification,
                result,
            },
            record,
        ))
    }

    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}
