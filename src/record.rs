use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ScrapeError};

/// One index constituent. Field order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    /// Market capitalization in euros.
    pub size: f64,
    /// Daily change in percentage points.
    pub change: f64,
    /// Empty until [`finalize`] runs.
    pub ticker: String,
}

impl Record {
    pub fn new(name: impl Into<String>, size: f64, change: f64) -> Self {
        Self {
            name: name.into(),
            size,
            change,
            ticker: String::new(),
        }
    }
}

/// Manual name -> ticker corrections, matched case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct TickerOverrides {
    by_name: HashMap<String, String>,
}

impl TickerOverrides {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let by_name = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_uppercase(), v.into()))
            .collect();
        Self { by_name }
    }

    /// Reads a JSON object of `"name": "TICKER"` pairs.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ScrapeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let pairs: HashMap<String, String> = serde_json::from_str(&raw)?;
        Ok(Self::from_pairs(pairs))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(&name.trim().to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

/// Best-effort symbol: uppercase Latin letters of the first word, at most four.
///
/// `IBERDROLA, S.A.` gives `IBER`; a title-cased `Banco Santander` gives only `B`.
pub fn derive_ticker(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_uppercase)
        .take(4)
        .collect()
}

/// Uppercases the first letter of every run of letters and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Stable sort, largest capitalization first.
pub fn sort_by_size_desc(records: &mut [Record]) {
    records.sort_by(|a, b| b.size.total_cmp(&a.size));
}

/// Attaches tickers and orders the snapshot.
pub fn finalize(mut records: Vec<Record>, overrides: &TickerOverrides) -> Vec<Record> {
    for record in &mut records {
        record.ticker = match overrides.get(&record.name) {
            Some(ticker) => ticker.to_string(),
            None => derive_ticker(&record.name),
        };
    }
    sort_by_size_desc(&mut records);
    records
}
