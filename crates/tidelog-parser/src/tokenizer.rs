/// Splits one CSV line into trimmed fields.
///
/// Every `"` toggles quoting wherever it appears in a field and is dropped;
/// `""` inside quotes is a literal quote. Commas inside quotes are kept, and
/// whitespace around a quoted run is trimmed with the rest of the field. A
/// quote that is never closed swallows the rest of the line instead of
/// failing.
pub fn parse_line(line: &str) -> Vec<String> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Non-blank lines of a file paired with their 1-based line numbers.
pub(crate) fn content_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect()
}
