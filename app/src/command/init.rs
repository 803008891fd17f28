use docflow_config::Config;
use std::path::PathBuf;

/// Strategy for initializing the configuration.
///
/// Writes the template to `~/docflow/config.json`, or to the path given with
/// `--config`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = Option<PathBuf>;

    async fn execute(&self, config_path: Self::Input) -> anyhow::Result<()> {
        match config_path {
            Some(path) => {
                Config::create_config_at(&path)?;
                println!("✅ Created config file at: {}", path.display());
                Ok(())
            }
            None => Config::create_config(),
        }
    }
}
