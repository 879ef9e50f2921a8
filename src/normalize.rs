//! Locale-aware conversion of scraped cell text into numbers.
//!
//! Every function here is a try-parse: text that does not look like the expected shape
//! yields `None`, and callers drop the row.

use std::sync::OnceLock;

use regex::Regex;

const MILLION: f64 = 1e6;
const BILLION: f64 = 1e9;

fn mil_millones_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+(?:[.,][0-9]+)?)\s*mil\s*M").unwrap())
}

fn magnitude_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+(?:[.,][0-9]+)*)\s*([MB])?").unwrap())
}

fn percentage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([+-]?[0-9]+(?:[.,][0-9]+)?)\s*%?").unwrap())
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+(?:[.,][0-9]+)*)\s*(EUR|USD)").unwrap())
}

/// `1.234,5` -> `1234.5`
fn european_to_f64(number: &str) -> Option<f64> {
    number.replace('.', "").replace(',', ".").parse().ok()
}

/// Decimal comma only; dots are left alone.
fn decimal_comma_to_f64(number: &str) -> Option<f64> {
    number.replace(',', ".").parse().ok()
}

/// Parses capitalization text such as `33,69B`, `1.234,5M` or `198 mil M` into euros.
///
/// The "mil M" idiom (thousand million) is tried first since the plain shape would
/// otherwise accept its leading number without a unit.
pub fn parse_magnitude(text: &str) -> Option<f64> {
    if let Some(caps) = mil_millones_re().captures(text) {
        return decimal_comma_to_f64(&caps[1]).map(|v| v * BILLION);
    }

    let caps = magnitude_re().captures(text)?;
    let value = european_to_f64(&caps[1])?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some("B") => BILLION,
        Some("M") => MILLION,
        _ => 1.0,
    };
    Some(value * scale)
}

/// Parses a signed daily change such as `+0,69 %` into percentage points.
pub fn parse_percentage(text: &str) -> Option<f64> {
    let caps = percentage_re().captures(text)?;
    decimal_comma_to_f64(&caps[1])
}

/// Parses a currency-tagged figure such as `12.345,6 EUR`.
///
/// The figure is assumed to be quoted in millions and is scaled to units.
pub fn parse_currency_millions(text: &str) -> Option<f64> {
    let caps = currency_re().captures(text)?;
    european_to_f64(&caps[1]).map(|v| v * MILLION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() <= b.abs() * 1e-12)
    }

    #[test]
    fn magnitude_billions_with_decimal_comma() {
        assert!(approx(parse_magnitude("33,69B"), 33.69e9));
    }

    #[test]
    fn magnitude_mil_millones() {
        assert!(approx(parse_magnitude("198 mil M"), 198e9));
        assert!(approx(parse_magnitude("1,5 mil M"), 1.5e9));
    }

    #[test]
    fn magnitude_thousands_separator() {
        assert_eq!(parse_magnitude("1.234,5M"), Some(1234.5e6));
    }

    #[test]
    fn magnitude_without_unit_is_unscaled() {
        assert_eq!(parse_magnitude("1.500"), Some(1500.0));
    }

    #[test]
    fn magnitude_rejects_text() {
        assert_eq!(parse_magnitude("not a number"), None);
        assert_eq!(parse_magnitude(""), None);
    }

    #[test]
    fn percentage_signs_and_suffix() {
        assert!(approx(parse_percentage("+0,69 %"), 0.69));
        assert!(approx(parse_percentage("-1,2%"), -1.2));
        assert!(approx(parse_percentage("0.5"), 0.5));
        assert_eq!(parse_percentage(""), None);
        assert_eq!(parse_percentage("n/a"), None);
    }

    #[test]
    fn currency_in_millions() {
        assert!(approx(parse_currency_millions("12.345,6 EUR"), 12345.6e6));
        assert!(approx(parse_currency_millions("800 USD"), 800e6));
        assert_eq!(parse_currency_millions("800"), None);
    }
}
