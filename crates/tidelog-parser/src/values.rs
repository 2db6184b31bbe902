use crate::model::CellValue;

/// Header stems whose columns hold identifiers, never quantities.
pub const IDENTIFIER_HEADERS: &[&str] = &["sample", "station", "farm", "image", "site", "location"];

const NULL_TOKENS: &[&str] = &["null", "na", "nan"];

/// Types one non-time cell using its header for context.
pub fn type_value(raw: &str, header: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NULL_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        return CellValue::Null;
    }

    if is_identifier_header(header) {
        return CellValue::Text(trimmed.to_string());
    }

    match parse_number(trimmed) {
        Some(value) => CellValue::Number(value),
        None => CellValue::Text(trimmed.to_string()),
    }
}

/// `Sample_ID`, `station id`, `Site` and the like.
pub fn is_identifier_header(header: &str) -> bool {
    let normalized: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    let stem = normalized.strip_suffix("id").unwrap_or(&normalized);
    IDENTIFIER_HEADERS.contains(&stem)
}

/// Accepts a token only if the whole of it is a plain finite decimal literal,
/// so prefixes like `1-NE-3` stay text.
fn parse_number(token: &str) -> Option<f64> {
    let plain = token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !plain || !token.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}
