//! Store round-trip tests.
//!
//! The in-memory backend runs everywhere. The Redis variant needs a server
//! reachable at `DOCFLOW_TEST_REDIS_URL` (default `redis://127.0.0.1:6379/15`)
//! and is ignored unless requested with `cargo test -- --ignored`.

use docflow_core::{DocumentFormat, DocumentStore, ExtractionResult, new_conversation_id};
use docflow_memory::{InMemoryStore, RedisStore};
use serde_json::json;

fn rfq_payload() -> ExtractionResult {
    ExtractionResult::new()
        .with("status", "processed")
        .with("intent", "RFQ")
        .with(
            "fields",
            json!({"product": "Widget", "quantity": 5, "deadline": "2024-01-01"}),
        )
        .with("anomalies", json!(["Missing: budget_range"]))
}

async fn assert_round_trip(store: &dyn DocumentStore) {
    let id = new_conversation_id();
    let stored = store
        .store(&id, "rfq.json", DocumentFormat::Json, "RFQ", &rfq_payload())
        .await
        .unwrap();

    let fetched = store.get(&id).await.unwrap();
    assert_eq!(fetched, Some(stored));

    let keys = store.list_documents().await.unwrap();
    assert!(keys.contains(&format!("doc:{id}")));
}

#[tokio::test]
async fn test_in_memory_round_trip() {
    let store = InMemoryStore::new();
    assert_round_trip(&store).await;
}

#[tokio::test]
async fn test_in_memory_keeps_one_record_per_conversation() {
    let store = InMemoryStore::new();
    let first = new_conversation_id();
    let second = new_conversation_id();

    store
        .store(&first, "a.txt", DocumentFormat::Email, "Complaint", &ExtractionResult::new())
        .await
        .unwrap();
    store
        .store(&second, "b.txt", DocumentFormat::Email, "Invoice", &ExtractionResult::new())
        .await
        .unwrap();

    assert_eq!(store.list_documents().await.unwrap().len(), 2);
    assert_eq!(store.get(&first).await.unwrap().unwrap().intent, "Complaint");
    assert_eq!(store.get(&second).await.unwrap().unwrap().intent, "Invoice");
}

#[tokio::test]
#[ignore = "requires a running Redis server"]
async fn test_redis_round_trip() {
    let url = std::env::var("DOCFLOW_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string());
    let store = RedisStore::connect(&url).await.unwrap();
    assert_round_trip(&store).await;
}
