use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

/// Trimmed cell texts of one `<tr>`, in document order.
pub type RawRow = Vec<String>;

fn table_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table").unwrap())
}

fn row_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table tr").unwrap())
}

fn cell_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("td").unwrap())
}

pub fn has_table(document: &Html) -> bool {
    document.select(table_selector()).next().is_some()
}

/// Every row of every table with at least `min_cells` data cells.
///
/// Header rows made of `<th>` only have no data cells and fall under any positive minimum.
pub fn table_rows(document: &Html, min_cells: usize) -> impl Iterator<Item = RawRow> + '_ {
    document
        .select(row_selector())
        .map(|tr| tr.select(cell_selector()).map(cell_text).collect::<RawRow>())
        .filter(move |cells| cells.len() >= min_cells)
}

/// Text nodes of the cell, each trimmed, joined by a single space.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th>Name</th><th>Cap</th><th>Chg</th><th>Vol</th></tr>
          <tr><td> Iberdrola </td><td><span>98,1</span> <b>B</b></td><td>+0,69 %</td><td>1</td></tr>
          <tr><td>Short</td><td>1B</td></tr>
        </table>
        <table>
          <tr><td>Inditex</td><td>150B</td><td>-1,2%</td><td>2</td><td>extra</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn rows_below_minimum_are_skipped() {
        let doc = Html::parse_document(PAGE);
        let rows: Vec<RawRow> = table_rows(&doc, 4).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "Iberdrola");
        assert_eq!(rows[1][0], "Inditex");

        assert_eq!(table_rows(&doc, 5).count(), 1);
        assert_eq!(table_rows(&doc, 2).count(), 3);
    }

    #[test]
    fn cell_text_joins_nodes_with_space() {
        let doc = Html::parse_document(PAGE);
        let first = table_rows(&doc, 4).next().unwrap();
        assert_eq!(first[1], "98,1 B");
    }

    #[test]
    fn sequence_restarts() {
        let doc = Html::parse_document(PAGE);
        let a: Vec<RawRow> = table_rows(&doc, 4).collect();
        let b: Vec<RawRow> = table_rows(&doc, 4).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn detects_missing_table() {
        assert!(has_table(&Html::parse_document(PAGE)));
        assert!(!has_table(&Html::parse_document("<p>maintenance</p>")));
    }
}
