//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use docflow_config::Config;
use docflow_core::{DocumentStore, LLMProvider};
use docflow_memory::{StoreConfig, connect_store};
use docflow_providers::{GeminiProvider, ScriptedProvider};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod info;
mod init;
mod list;
mod process;
mod show;
mod version;

pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use list::ListStrategy;
pub use process::{ProcessInput, ProcessStrategy};
pub use show::ShowStrategy;
pub use version::VersionStrategy;

/// Reply of the offline provider. Never an object, so every extractor ends
/// up on its pattern fallback.
const OFFLINE_REPLY: &str = "Unknown";

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// parameters are passed without runtime casting or boxing.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Gemini provider from config, with an optional model override.
fn gemini_provider(
    config: &Config,
    model: Option<String>,
) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let gemini = &config.provider.gemini;
    if !gemini.has_api_key() {
        anyhow::bail!("No Gemini API key configured. Edit the config file or pass --offline.");
    }

    let model = model.unwrap_or_else(|| gemini.model.clone());
    info!("Using Gemini model {}", model);

    let provider = GeminiProvider::new(gemini.api_key.clone())
        .with_base_url(gemini.base_url.clone())
        .with_model(model)
        .with_retry_policy(config.provider.retry.clone());
    Ok(Arc::new(provider))
}

fn offline_provider() -> Arc<dyn LLMProvider> {
    info!("Offline mode: pattern extraction only");
    Arc::new(ScriptedProvider::repeating(OFFLINE_REPLY))
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store = connect_store(config).await?;
    info!("Document store: {}", store.backend_name());
    Ok(store)
}
