use serde::{Deserialize, Serialize};

/// Which backend to use for document records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Redis when reachable, otherwise the in-process map.
    #[default]
    Auto,
    /// Redis only; startup fails when it is unreachable.
    Redis,
    /// In-process map, never touches the network.
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "StoreConfig::default_host")]
    pub host: String,
    #[serde(default = "StoreConfig::default_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    /// Upper bound for the startup probe.
    #[serde(default = "StoreConfig::default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            host: Self::default_host(),
            port: Self::default_port(),
            db: 0,
            connect_timeout_secs: Self::default_connect_timeout(),
        }
    }
}

impl StoreConfig {
    fn default_host() -> String {
        "localhost".to_string()
    }

    const fn default_port() -> u16 {
        6379
    }

    const fn default_connect_timeout() -> u64 {
        2
    }

    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}
