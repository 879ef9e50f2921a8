//! Per-page extractors. Each one knows the row layout of a single site.

use std::collections::HashMap;

use scraper::Html;
use tracing::debug;

use crate::normalize::{parse_currency_millions, parse_magnitude, parse_percentage};
use crate::record::Record;
use crate::settings::{CAPITALIZATION_MIN_CELLS, CHANGE_COLUMN, CHANGE_MIN_CELLS, PRIMARY_MIN_CELLS};
use crate::table::table_rows;

/// Uppercased name -> value, iterated in first-seen order.
///
/// A repeated name overwrites the value and keeps its original position.
#[derive(Debug, Default, Clone)]
pub struct NameMap {
    order: Vec<String>,
    values: HashMap<String, f64>,
}

impl NameMap {
    pub fn insert(&mut self, name: &str, value: f64) {
        let key = name.to_uppercase();
        if self.values.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.order.iter().map(|k| (k.as_str(), self.values[k]))
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut map = NameMap::default();
        for (name, value) in iter {
            map.insert(name.as_ref(), value);
        }
        map
    }
}

/// A capitalization of zero or less is as unusable as an unparseable one.
fn positive(size: Option<f64>) -> Option<f64> {
    size.filter(|s| s.is_finite() && *s > 0.0)
}

/// Rows shaped `[name, capitalization, change, ...]`.
pub fn primary_records(document: &Html) -> Vec<Record> {
    table_rows(document, PRIMARY_MIN_CELLS)
        .filter_map(|row| {
            let size = positive(parse_magnitude(&row[1]));
            let change = parse_percentage(&row[2]);
            match (size, change) {
                (Some(size), Some(change)) => Some(Record::new(row[0].clone(), size, change)),
                _ => {
                    debug!(name = %row[0], cap = %row[1], chg = %row[2], "primary row dropped");
                    None
                }
            }
        })
        .collect()
}

/// Rows shaped `[name, ..., capitalization]`, capitalization in the last cell.
pub fn capitalization_map(document: &Html) -> NameMap {
    table_rows(document, CAPITALIZATION_MIN_CELLS)
        .filter_map(|row| {
            let last = row.last()?;
            let size = positive(parse_currency_millions(last));
            if size.is_none() {
                debug!(name = %row[0], cap = %last, "capitalization row dropped");
            }
            Some((row[0].clone(), size?))
        })
        .collect()
}

/// Rows shaped `[name, ..., change, ...]` with the change at a fixed column.
pub fn change_map(document: &Html) -> NameMap {
    table_rows(document, CHANGE_MIN_CELLS)
        .filter_map(|row| {
            let change = parse_percentage(&row[CHANGE_COLUMN]);
            if change.is_none() {
                debug!(name = %row[0], chg = %row[CHANGE_COLUMN], "change row dropped");
            }
            Some((row[0].clone(), change?))
        })
        .collect()
}
