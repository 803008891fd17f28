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

//! Document classification and extraction pipeline.
//!
//! Control flow is strictly linear: classify → extract → store. Each
//! document is fully handled before the next one is accepted.
//!
//! # Components
//! - [`Classifier`]: format sniffing plus one intent prompt
//! - [`JsonExtractor`], [`EmailExtractor`], [`PdfExtractor`]: one per format
//! - [`extraction::strategy`]: bounded model attempts followed by a
//!   deterministic regex fallback
//! - [`DocumentPipeline`] and [`DocumentSession`]: wiring and per-session history

mod classifier;
pub mod extraction;
mod pipeline;
mod session;
mod settings;

pub use classifier::{Classifier, detect_format, looks_like_email, normalize_intent};
pub use extraction::email::{EmailExtractor, detect_urgency};
pub use extraction::json::JsonExtractor;
pub use extraction::pdf::{PdfExtractor, pdf_to_text};
pub use pipeline::DocumentPipeline;
pub use session::{DocumentSession, HistoryEntry};
pub use settings::ExtractionSettings;
