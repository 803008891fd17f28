use docflow_core::TIMESTAMP_FORMAT;
use docflow_pipeline::{DocumentPipeline, DocumentSession};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Input parameters for the Process command strategy.
#[derive(Debug, Clone)]
pub struct ProcessInput {
    pub config_path: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    /// Conversation id to resume; a fresh one otherwise
    pub session: Option<Uuid>,
    pub model: Option<String>,
    /// Use the scripted provider instead of Gemini
    pub offline: bool,
}

/// Strategy for running documents through the pipeline.
///
/// Files are processed one after another under a single conversation id.
/// Each output record is printed as pretty JSON on stdout, followed by the
/// session history. A file that cannot be read is reported and skipped.
#[derive(Debug, Clone, Copy)]
pub struct ProcessStrategy;

impl super::CommandStrategy for ProcessStrategy {
    type Input = ProcessInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = match super::load_config(input.config_path.as_deref()) {
            Ok(config) => Some(config),
            Err(e) if input.offline => {
                warn!("{e}; continuing with default settings");
                None
            }
            Err(e) => return Err(e),
        };

        let provider = match &config {
            Some(config) if !input.offline => super::gemini_provider(config, input.model)?,
            _ => super::offline_provider(),
        };
        let store_config = config
            .as_ref()
            .map(|c| c.store.clone())
            .unwrap_or_default();
        let settings = config
            .as_ref()
            .map(|c| c.extraction.clone())
            .unwrap_or_default();

        let store = super::open_store(&store_config).await?;
        let backend = store.backend_name();
        let pipeline = Arc::new(DocumentPipeline::new(provider, store, &settings));

        let mut session = match input.session {
            Some(id) => DocumentSession::resume(pipeline, id),
            None => DocumentSession::new(pipeline),
        };
        info!("Conversation {}", session.id());

        let mut failed = 0usize;
        for path in &input.files {
            match session.process_file(path).await {
                Ok(processed) => {
                    println!("{}", serde_json::to_string_pretty(&processed.to_output())?);
                }
                Err(e) => {
                    error!("Failed to process {}: {e}", path.display());
                    failed += 1;
                }
            }
        }

        println!();
        println!("=== Session {} ===", session.id());
        println!("Storage: {backend}");
        for entry in session.history() {
            println!(
                "  [{}] {} -> {} / {}",
                entry.timestamp.format(TIMESTAMP_FORMAT),
                entry.file,
                entry.classification.format(),
                entry.classification.intent()
            );
        }

        if failed > 0 {
            anyhow::bail!("{failed} of {} documents failed", input.files.len());
        }
        Ok(())
    }
}
