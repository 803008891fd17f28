use std::path::PathBuf;
use uuid::Uuid;

/// Strategy for printing the record stored under a conversation id.
#[derive(Debug, Clone, Copy)]
pub struct ShowStrategy;

impl super::CommandStrategy for ShowStrategy {
    type Input = (Option<PathBuf>, Uuid);

    async fn execute(&self, (config_path, session): Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(config_path.as_deref())?;
        let store = super::open_store(&config.store).await?;

        match store.get(&session).await? {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
            None => {
                println!(
                    "No document stored for conversation {session} in {}",
                    store.backend_name()
                );
            }
        }

        Ok(())
    }
}
