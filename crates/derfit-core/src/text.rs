//! Text canonicalization shared by every lookup key in the system.
//!
//! - [`normalize`] turns city names and column headers into stable keys
//! - [`extract_number`] pulls the first decimal number out of a power string
//! - [`standardize_voltage`] produces the canonical voltage join key

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Parenthesized annotation, including an unterminated trailing one.
static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*(\)|$)").unwrap());

/// First run of digits, dots and commas that contains at least one digit.
///
/// Punctuation-only runs such as the dot in "Inv. 5 kW" are skipped, not taken as the
/// (unparsable) first run.
static NUMBER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.,]*\d[\d.,]*").unwrap());

/// Trailing voltage unit ("V", "kV"), case-insensitive.
static VOLTAGE_UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*k?v\s*$").unwrap());

/// Separator used by dual-value voltages such as `220/127`.
pub const VOLTAGE_SEPARATOR: char = '/';

/// Canonicalize a free-text identifier into a lookup key.
///
/// Parenthesized annotations are removed, accents are stripped (NFD followed by dropping
/// combining marks), the text is lowercased and whitespace runs become a single `_`.
///
/// ```
/// use derfit_core::text::normalize;
///
/// assert_eq!(normalize("São Paulo (Capital)"), "sao_paulo");
/// assert_eq!(normalize("  Carga   Instalada "), "carga_instalada");
/// ```
pub fn normalize(text: &str) -> String {
    let without_notes = PARENTHETICAL.replace_all(text, " ");
    let folded: String = without_notes
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Extract the first decimal number from a loosely formatted string.
///
/// Comma and dot are both accepted as decimal separators. Returns `None` when no digits
/// are present or the numeral is malformed (e.g. `"5,5,5"`).
///
/// ```
/// use derfit_core::text::extract_number;
///
/// assert_eq!(extract_number("5,5 kWp"), Some(5.5));
/// assert_eq!(extract_number("abc"), None);
/// ```
pub fn extract_number(text: &str) -> Option<f64> {
    let run = NUMBER_RUN.find(text)?;
    let numeral = run.as_str().replace(',', ".");
    numeral.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonicalize a voltage rating so the same physical voltage joins across tables.
///
/// Unit suffixes are removed. Dual values are split on `/`, sorted descending by numeric
/// value and rejoined; values that are not fully numeric only lose their unit suffix.
///
/// ```
/// use derfit_core::text::standardize_voltage;
///
/// assert_eq!(standardize_voltage("220/127V"), "220/127");
/// assert_eq!(standardize_voltage("127/220 V"), "220/127");
/// assert_eq!(standardize_voltage("380 V"), "380");
/// ```
pub fn standardize_voltage(raw: &str) -> String {
    let stripped = strip_voltage_unit(raw);
    if !stripped.contains(VOLTAGE_SEPARATOR) {
        return stripped;
    }

    let parts: Vec<String> = stripped
        .split(VOLTAGE_SEPARATOR)
        .map(strip_voltage_unit)
        .collect();
    let values: Option<Vec<f64>> = parts.iter().map(|p| parse_plain_number(p)).collect();
    let Some(values) = values else {
        return stripped;
    };

    let mut ranked: Vec<(f64, &String)> = values.into_iter().zip(parts.iter()).collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked
        .into_iter()
        .map(|(_, part)| part.as_str())
        .collect::<Vec<_>>()
        .join(&VOLTAGE_SEPARATOR.to_string())
}

fn strip_voltage_unit(raw: &str) -> String {
    VOLTAGE_UNIT.replace(raw.trim(), "").trim().to_string()
}

fn parse_plain_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok()
}
