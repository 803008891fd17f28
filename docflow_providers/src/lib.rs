#![deny(
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

mod gemini;
pub mod retry;
mod scripted;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiProvider};
pub use retry::{RetryPolicy, retry_with_backoff, retry_with_backoff_if};
pub use scripted::ScriptedProvider;
