#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Document record storage.
//!
//! Two interchangeable [`DocumentStore`] backends: a Redis hash store that
//! survives restarts and a process-local map. [`connect_store`] probes Redis
//! once at startup and settles on one of them for the rest of the process.

mod config;
mod error;
mod in_memory;
mod redis_store;
mod selector;

pub use docflow_core::DocumentStore;

pub use config::{StoreBackend, StoreConfig};
pub use error::{Result, StoreError};
pub use in_memory::InMemoryStore;
pub use redis_store::RedisStore;
pub use selector::connect_store;
