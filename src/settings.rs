use std::path::PathBuf;
use std::time::Duration;

/// Index components page; one row per constituent with name, capitalization and change.
pub const PRIMARY_URL: &str = "https://es.marketscreener.com/cotizacion/indice/IBEX-35-7629/componentes/";
/// Capitalization-by-index page, used only on fallback.
pub const CAPITALIZATION_URL: &str = "https://markets.businessinsider.com/index/market-capitalization/ibex_35";
/// Components page with the daily change column, used only on fallback.
pub const CHANGE_URL: &str = "https://www.investing.com/indices/spain-35-components";

/// The change page refuses requests without a browser-like agent.
pub const CHANGE_USER_AGENT: &str = "Mozilla/5.0";

pub const DEFAULT_OUTPUT: &str = "data/ibex35.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fewer primary records than this and the primary page is discarded.
pub const COMPLETENESS_THRESHOLD: usize = 30;

pub const PRIMARY_MIN_CELLS: usize = 4;
pub const CAPITALIZATION_MIN_CELLS: usize = 7;
pub const CHANGE_MIN_CELLS: usize = 5;
/// Zero-based index of the "Chg. %" column on the change page.
pub const CHANGE_COLUMN: usize = 4;

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output: PathBuf,
    pub timeout: Duration,
    pub tickers: Option<PathBuf>,
}
