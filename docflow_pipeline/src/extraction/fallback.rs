//! Deterministic pattern extraction.
//!
//! Used when the model never returns a usable object. Nothing in here calls
//! out or fails: every function produces a mapping, at minimum a
//! `content_preview`.

use docflow_core::ExtractionResult;
use docflow_core::util::content_preview;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static FROM_LINE: OnceLock<Regex> = OnceLock::new();
static SUBJECT_LINE: OnceLock<Regex> = OnceLock::new();
static VENDOR_LINE: OnceLock<Regex> = OnceLock::new();
static QUANTITY: OnceLock<Regex> = OnceLock::new();
static ISO_DATE: OnceLock<Regex> = OnceLock::new();
static INVOICE_NUMBER: OnceLock<Regex> = OnceLock::new();
static TOTAL_AMOUNT: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex patterns are fixed at compile time"
)]
fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Static regex pattern is guaranteed to be valid"))
}

fn from_line() -> &'static Regex {
    compiled(&FROM_LINE, r"From:\s*([^\n]+)")
}

fn subject_line() -> &'static Regex {
    compiled(&SUBJECT_LINE, r"Subject:\s*([^\n]+)")
}

fn vendor_line() -> &'static Regex {
    compiled(&VENDOR_LINE, r"Vendor:\s*([^\n]+)")
}

fn quantity() -> &'static Regex {
    compiled(&QUANTITY, r"(?i)\b(\d+)\s*(units|pieces|items)\b")
}

fn iso_date() -> &'static Regex {
    compiled(&ISO_DATE, r"\b\d{4}-\d{2}-\d{2}\b")
}

fn invoice_number() -> &'static Regex {
    compiled(&INVOICE_NUMBER, r"Invoice\s*#?\s*([\w\-]+)")
}

fn total_amount() -> &'static Regex {
    compiled(&TOTAL_AMOUNT, r"Total\s*(?:Due|Amount)?:\s*\$?(\d[\d,.]*)")
}

/// Trimmed first capture group of the first match.
fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Value of the first `From:` header.
#[must_use]
pub fn from_header(text: &str) -> Option<String> {
    first_capture(from_line(), text)
}

/// Value of the first `Vendor:` line.
#[must_use]
pub fn vendor_header(text: &str) -> Option<String> {
    first_capture(vendor_line(), text)
}

/// Sender, subject, quantities and ISO dates of an email body.
#[must_use]
pub fn email_entities(text: &str, preview_chars: usize) -> ExtractionResult {
    let mut entities = ExtractionResult::new();

    if let Some(sender) = from_header(text) {
        entities.insert("sender", sender);
    }
    if let Some(subject) = first_capture(subject_line(), text) {
        entities.insert("subject", subject);
    }

    let quantities: Vec<Value> = quantity()
        .captures_iter(text)
        .map(|caps| Value::String(format!("{} {}", &caps[1], &caps[2])))
        .collect();
    if !quantities.is_empty() {
        entities.insert("quantities", quantities);
    }

    let dates: Vec<Value> = iso_date()
        .find_iter(text)
        .map(|m| Value::String(m.as_str().to_string()))
        .collect();
    if !dates.is_empty() {
        entities.insert("dates", dates);
    }

    entities.insert("content_preview", content_preview(text, preview_chars));
    entities
}

/// Invoice number, vendor and total of an invoice-like document.
#[must_use]
pub fn invoice_entities(text: &str, preview_chars: usize) -> ExtractionResult {
    let mut entities = ExtractionResult::new();

    if let Some(number) = first_capture(invoice_number(), text) {
        entities.insert("invoice_number", number);
    }
    if let Some(vendor) = vendor_header(text) {
        entities.insert("vendor", vendor);
    }
    if let Some(total) = first_capture(total_amount(), text) {
        entities.insert("total_amount", total);
    }

    entities.insert("content_preview", content_preview(text, preview_chars));
    entities
}
