use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored record {key} is missing field `{field}`")]
    MissingField { key: String, field: &'static str },

    #[error("Stored record {key} has an invalid `{field}`: {reason}")]
    InvalidField {
        key: String,
        field: &'static str,
        reason: String,
    },
}
