use std::path::PathBuf;

/// Strategy for listing every stored document key.
#[derive(Debug, Clone, Copy)]
pub struct ListStrategy;

impl super::CommandStrategy for ListStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, config_path: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(config_path.as_deref())?;
        let store = super::open_store(&config.store).await?;

        let keys = store.list_documents().await?;
        println!("{} document(s) in {}", keys.len(), store.backend_name());
        for key in keys {
            println!("  {key}");
        }

        Ok(())
    }
}
