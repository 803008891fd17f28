use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

// Section types live next to the code that consumes them
use docflow_memory::StoreConfig;
use docflow_pipeline::ExtractionSettings;
use docflow_providers::{DEFAULT_BASE_URL, DEFAULT_MODEL, RetryPolicy};

const CONFIG_DIR: &str = "docflow";
const CONFIG_FILE: &str = "config.json";
const API_KEY_PLACEHOLDER: &str = "your-gemini-api-key-here";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub extraction: ExtractionSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "GeminiConfig::default_model")]
    pub model: String,
    #[serde(default = "GeminiConfig::default_base_url")]
    pub base_url: String,
}

impl GeminiConfig {
    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    /// Whether the key is still the template placeholder or blank.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    /// First and last four characters, for display.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl Config {
    pub fn default_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'docflow init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Invalid config file {}: {e}", config_path.display())
        })?;
        debug!("Loaded config from {}", config_path.display());

        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// The file `docflow init` writes.
    #[must_use]
    pub fn template() -> String {
        format!(
            r#"{{
  "provider": {{
    "gemini": {{
      "api_key": "{API_KEY_PLACEHOLDER}",
      "model": "{DEFAULT_MODEL}",
      "base_url": "{DEFAULT_BASE_URL}"
    }},
    "retry": {{
      "base_delays_secs": [1, 2, 4],
      "final_retries": 0,
      "final_delay_secs": 10
    }}
  }},
  "store": {{
    "backend": "auto",
    "host": "localhost",
    "port": 6379,
    "db": 0,
    "connect_timeout_secs": 2
  }},
  "extraction": {{
    "max_attempts": 3,
    "intent_context_chars": 1500,
    "pdf_context_chars": 2000,
    "preview_chars": 100
  }}
}}"#
        )
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);
        Self::create_config_at(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key");
        println!("   2. Optionally start Redis at the configured host and port");
        println!("   3. Run 'docflow process <FILES>...' to process documents");
        println!();
        println!("🔧 Configuration options:");
        println!("   - provider.gemini.model: Gemini model to use (gemini-1.5-flash, gemini-1.5-pro, etc.)");
        println!("   - store.backend: auto (Redis with in-memory fallback), redis, or memory");
        println!("   - extraction.max_attempts: Model attempts before pattern fallback");
        println!();
        Ok(())
    }

    /// Write the template to `config_path`, refusing to overwrite.
    pub fn create_config_at(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(config_path, Self::template())?;
        Ok(())
    }
}
