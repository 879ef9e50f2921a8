use scraper::Html;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::fetch::{Fetch, PageRequest};
use crate::record::{finalize, title_case, Record, TickerOverrides};
use crate::settings::{
    CAPITALIZATION_URL, CHANGE_URL, CHANGE_USER_AGENT, COMPLETENESS_THRESHOLD, PRIMARY_URL,
};
use crate::sources::{capitalization_map, change_map, primary_records, NameMap};
use crate::table::has_table;

/// The three pages a run may touch.
#[derive(Debug, Clone)]
pub struct Sources {
    pub primary: PageRequest,
    pub capitalization: PageRequest,
    pub change: PageRequest,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            primary: PageRequest::get(PRIMARY_URL),
            capitalization: PageRequest::get(CAPITALIZATION_URL),
            change: PageRequest::get(CHANGE_URL).with_user_agent(CHANGE_USER_AGENT),
        }
    }
}

/// Which path produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Primary,
    Fallback,
}

#[derive(Debug)]
pub struct Collected {
    pub stage: Stage,
    pub records: Vec<Record>,
}

/// Collects unordered records, falling back to the merged secondary pages when the
/// primary page is unreachable or too thin.
pub fn collect_records(fetcher: &impl Fetch, sources: &Sources) -> Result<Collected> {
    let primary = try_primary(fetcher, &sources.primary);
    if primary.len() >= COMPLETENESS_THRESHOLD {
        info!(records = primary.len(), "primary source accepted");
        return Ok(Collected {
            stage: Stage::Primary,
            records: primary,
        });
    }

    info!(
        records = primary.len(),
        threshold = COMPLETENESS_THRESHOLD,
        "primary source insufficient, using fallback pages"
    );
    let caps = fetch_document(fetcher, &sources.capitalization, capitalization_map)?;
    if caps.is_empty() {
        warn!(url = %sources.capitalization.url, "capitalization page yielded no rows");
    }
    let changes = fetch_document(fetcher, &sources.change, change_map)?;
    let records = merge(&caps, &changes);
    info!(
        capitalizations = caps.len(),
        changes = changes.len(),
        merged = records.len(),
        "fallback sources merged"
    );
    Ok(Collected {
        stage: Stage::Fallback,
        records,
    })
}

/// Collects, attaches tickers and sorts.
pub fn build_snapshot(
    fetcher: &impl Fetch,
    sources: &Sources,
    overrides: &TickerOverrides,
) -> Result<Vec<Record>> {
    let collected = collect_records(fetcher, sources)?;
    debug!(stage = ?collected.stage, records = collected.records.len(), "finalizing");
    Ok(finalize(collected.records, overrides))
}

fn try_primary(fetcher: &impl Fetch, request: &PageRequest) -> Vec<Record> {
    match fetch_document(fetcher, request, primary_records) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "primary source failed");
            Vec::new()
        }
    }
}

fn fetch_document<T>(
    fetcher: &impl Fetch,
    request: &PageRequest,
    extract: impl FnOnce(&Html) -> T,
) -> Result<T> {
    let body = fetcher.fetch(request)?;
    let document = Html::parse_document(&body);
    if !has_table(&document) {
        return Err(ScrapeError::NoTable {
            url: request.url.clone(),
        });
    }
    Ok(extract(&document))
}

/// Inner join on the uppercased name, in capitalization-page order.
pub fn merge(caps: &NameMap, changes: &NameMap) -> Vec<Record> {
    caps.iter()
        .filter_map(|(key, size)| match changes.get(key) {
            Some(change) => Some(Record::new(title_case(key), size, change)),
            None => {
                debug!(name = key, "no change for name, dropped");
                None
            }
        })
        .collect()
}
