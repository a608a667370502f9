// Locale-aware currency parsing.
//
// Source exports format amounts Indonesian-style: an `Rp` marker, `.` as the
// thousands separator and `,` as the decimal separator, e.g. `-Rp199.000` or
// `239,50`. Unparsable text resolves to missing rather than an error because
// the uploads are known to contain free-text and partially corrupt cells.
use crate::types::Cell;

/// Currency marker stripped from amount strings before parsing.
const CURRENCY_MARKER: &str = "Rp";

/// Parse a locale-formatted scalar into a signed number.
///
/// - Missing stays missing, never an error and never zero.
/// - Already-numeric cells pass through unchanged.
/// - Text is parsed per the source locale; anything that fails to parse
///   after normalization (including a bare sign with no digits) is missing.
pub fn parse(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Missing => None,
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => parse_str(s),
    }
}

fn parse_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let negative = trimmed.starts_with('-');
    let body = trimmed
        .replace('-', "")
        .replace(CURRENCY_MARKER, "")
        .replace(' ', "");
    // `.` groups thousands and is dropped; `,` is the decimal point.
    let body = body.replace('.', "").replace(',', ".");
    if body.is_empty() {
        return None;
    }
    let val: f64 = body.parse().ok()?;
    Some(if negative { -val } else { val })
}
