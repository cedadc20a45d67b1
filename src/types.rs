use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Claim-level fields read from the key/value block of the spreadsheet,
/// keyed by the exact trimmed label text. Built once per run, read-only
/// afterwards; a missing label yields a default, never an error.
#[derive(Debug, Clone, Default)]
pub struct ClaimMetadata {
    fields: HashMap<String, String>,
}

impl ClaimMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the trimmed label. A duplicate label overwrites the
    /// earlier value (last row wins, like the source workbook).
    pub fn insert(&mut self, label: &str, value: String) {
        self.fields.insert(label.trim().to_string(), value);
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, label: &str, default: &'a str) -> &'a str {
        self.get(label).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One validated expense row, in spreadsheet order. Prices are kept as the
/// 2-decimal display strings the document needs; the raw values only matter
/// for the running total, which `Claim` carries separately.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseLine {
    pub quantity: i64,
    pub reference: String,
    pub unit_price: String,
    pub total_price: String,
}

/// Everything the loader produces: metadata, ordered lines, the unrounded
/// total, and the receipt attachments found on disk.
#[derive(Debug, Clone)]
pub struct Claim {
    pub metadata: ClaimMetadata,
    pub lines: Vec<ExpenseLine>,
    pub total: f64,
    pub receipts: Vec<PathBuf>,
}

/// Fixed 2-decimal display form used for unit prices, line totals and the
/// claim total.
pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}
