use serde::{Deserialize, Serialize};

/// Limits shared by the classifier and the extractors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Model attempts before falling back to pattern extraction.
    #[serde(default = "ExtractionSettings::default_max_attempts")]
    pub max_attempts: usize,
    /// Characters of document text sent with the intent prompt.
    #[serde(default = "ExtractionSettings::default_intent_context_chars")]
    pub intent_context_chars: usize,
    /// Characters of PDF text sent with the invoice prompt.
    #[serde(default = "ExtractionSettings::default_pdf_context_chars")]
    pub pdf_context_chars: usize,
    /// Length of the `content_preview` added by fallback extraction.
    #[serde(default = "ExtractionSettings::default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_attempts: Self::default_max_attempts(),
            intent_context_chars: Self::default_intent_context_chars(),
            pdf_context_chars: Self::default_pdf_context_chars(),
            preview_chars: Self::default_preview_chars(),
        }
    }
}

impl ExtractionSettings {
    const fn default_max_attempts() -> usize {
        3
    }

    const fn default_intent_context_chars() -> usize {
        1500
    }

    const fn default_pdf_context_chars() -> usize {
        2000
    }

    const fn default_preview_chars() -> usize {
        100
    }
}
