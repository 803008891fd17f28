use async_trait::async_trait;
use docflow_core::{DocumentRecord, DocumentStore, document_key};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Process-local store. Records are kept as-is and vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, DocumentRecord>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn put(&self, conversation_id: &Uuid, record: &DocumentRecord) -> anyhow::Result<()> {
        let key = document_key(conversation_id);
        debug!("Storing {} in memory", key);
        self.records.write().await.insert(key, record.clone());
        Ok(())
    }

    async fn get(&self, conversation_id: &Uuid) -> anyhow::Result<Option<DocumentRecord>> {
        let key = document_key(conversation_id);
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn list_documents(&self) -> anyhow::Result<Vec<String>> {
        let mut keys: Vec<String> = self.records.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "In-Memory Storage"
    }
}
