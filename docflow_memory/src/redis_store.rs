//! Redis hash backend.
//!
//! Each record lives in a hash at `doc:<conversation_id>` with the fields
//! `source`, `format`, `intent`, `timestamp` and `extracted_data`. The last
//! one holds JSON text; scalars are stored verbatim.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use docflow_core::{DocumentFormat, DocumentRecord, DocumentStore, TIMESTAMP_FORMAT, document_key};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StoreError};

pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Open a connection and verify it with `PING`.
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to Redis at {}", url);
        let client = Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        debug!("Redis answered {}", pong);

        Ok(Self { connection })
    }
}

/// Flatten a record into hash fields.
pub(crate) fn record_to_fields(record: &DocumentRecord) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        ("source", record.source.clone()),
        ("format", record.format.to_string()),
        ("intent", record.intent.clone()),
        ("timestamp", record.formatted_timestamp()),
        ("extracted_data", serde_json::to_string(&record.extracted_data)?),
    ])
}

/// Rebuild a record from hash fields.
///
/// `extracted_data` that no longer parses is kept as the raw string.
pub(crate) fn record_from_fields(
    key: &str,
    mut fields: HashMap<String, String>,
) -> Result<DocumentRecord> {
    let mut take = |field: &'static str| {
        fields.remove(field).ok_or_else(|| StoreError::MissingField {
            key: key.to_string(),
            field,
        })
    };

    let source = take("source")?;
    let format_raw = take("format")?;
    let intent = take("intent")?;
    let timestamp_raw = take("timestamp")?;
    let extracted_raw = take("extracted_data")?;

    let format = format_raw.parse::<DocumentFormat>().map_err(|e| StoreError::InvalidField {
        key: key.to_string(),
        field: "format",
        reason: e.to_string(),
    })?;
    let timestamp = NaiveDateTime::parse_from_str(&timestamp_raw, TIMESTAMP_FORMAT).map_err(|e| {
        StoreError::InvalidField {
            key: key.to_string(),
            field: "timestamp",
            reason: e.to_string(),
        }
    })?;
    let extracted_data =
        serde_json::from_str(&extracted_raw).unwrap_or(Value::String(extracted_raw));

    Ok(DocumentRecord {
        source,
        format,
        intent,
        timestamp,
        extracted_data,
    })
}

#[async_trait]
impl DocumentStore for RedisStore {
    async fn put(&self, conversation_id: &Uuid, record: &DocumentRecord) -> anyhow::Result<()> {
        let key = document_key(conversation_id);
        let fields = record_to_fields(record)?;
        let mut connection = self.connection.clone();

        let _: () = connection
            .hset_multiple(&key, &fields)
            .await
            .map_err(StoreError::from)?;

        info!("Stored {} in Redis", key);
        Ok(())
    }

    async fn get(&self, conversation_id: &Uuid) -> anyhow::Result<Option<DocumentRecord>> {
        let key = document_key(conversation_id);
        let mut connection = self.connection.clone();

        let fields: HashMap<String, String> =
            connection.hgetall(&key).await.map_err(StoreError::from)?;
        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(record_from_fields(&key, fields)?))
    }

    async fn list_documents(&self) -> anyhow::Result<Vec<String>> {
        let mut connection = self.connection.clone();
        let mut keys: Vec<String> = connection.keys("doc:*").await.map_err(StoreError::from)?;
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "Redis Database"
    }
}
