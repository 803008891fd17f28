use docflow_memory::{StoreBackend, connect_store};
use std::path::PathBuf;
use tracing::info;

/// Strategy for displaying configuration information.
///
/// Prints the provider settings (key masked), retry schedule, store settings
/// with a live connection probe, and extraction limits.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, config_path: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(config_path.as_deref())?;

        println!("=== docflow Configuration ===\n");

        let gemini = &config.provider.gemini;
        println!("Provider:");
        if gemini.has_api_key() {
            println!("  Gemini API Key: {}", gemini.masked_api_key());
        } else {
            println!("  Gemini API Key: (not set)");
        }
        println!("  Model: {}", gemini.model);
        println!("  Base URL: {}", gemini.base_url);
        println!();

        let retry = &config.provider.retry;
        println!("Transport Retry:");
        println!("  Base Delays (s): {:?}", retry.base_delays_secs);
        println!(
            "  Final Retries: {} every {}s",
            retry.final_retries, retry.final_delay_secs
        );
        println!("  Total Attempts: {}", retry.total_attempts());
        println!();

        let store = &config.store;
        println!("Store:");
        println!("  Backend: {}", backend_label(store.backend));
        println!("  Redis URL: {}", store.redis_url());

        info!("Testing store connection");
        match connect_store(store).await {
            Ok(connected) => println!("  Status: Connected ({})", connected.backend_name()),
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        let extraction = &config.extraction;
        println!("Extraction:");
        println!("  Max Attempts: {}", extraction.max_attempts);
        println!("  Intent Context: {} chars", extraction.intent_context_chars);
        println!("  PDF Context: {} chars", extraction.pdf_context_chars);
        println!("  Preview: {} chars", extraction.preview_chars);

        Ok(())
    }
}

const fn backend_label(backend: StoreBackend) -> &'static str {
    match backend {
        StoreBackend::Auto => "auto (Redis, falling back to in-memory)",
        StoreBackend::Redis => "redis",
        StoreBackend::Memory => "memory",
    }
}
