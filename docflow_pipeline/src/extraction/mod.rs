//! Per-format extractors and the strategy they share.

pub mod email;
pub mod fallback;
pub mod json;
pub mod pdf;
pub mod strategy;

pub use strategy::{EntitySchema, extract_entities, request_structured};
