use std::collections::HashSet;

use crate::columns::{find_sample_id_column, find_time_column, TimeColumnMatch};
use crate::dates::detect_date_format;
use crate::errors::ParserError;
use crate::family::FileFamily;
use crate::header::detect_header_row;
use crate::limits::ParserLimits;
use crate::model::{DateFormat, ParseResult, ParseStage, ParseSummary, ParsedDataPoint};
use crate::time::{normalize_time, parse_canonical};
use crate::tokenizer::{content_lines, parse_line};
use crate::values::type_value;

/// One file handed to the parser: its name, raw bytes and how to read it.
#[derive(Debug, Clone, Copy)]
pub struct ParseRequest<'a> {
    pub file_name: &'a str,
    pub content: &'a [u8],
    pub family: FileFamily,
    /// Skips date-format inference when set.
    pub date_format_override: Option<DateFormat>,
}

impl<'a> ParseRequest<'a> {
    /// A request whose family is inferred from the file name.
    pub fn new(file_name: &'a str, content: &'a [u8]) -> Self {
        Self {
            file_name,
            content,
            family: FileFamily::infer(file_name),
            date_format_override: None,
        }
    }

    pub fn with_family(mut self, family: FileFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_date_format(mut self, format: Option<DateFormat>) -> Self {
        self.date_format_override = format;
        self
    }
}

/// Ordered trace of the decisions taken while parsing one file.
struct Trace {
    logs: Vec<String>,
}

impl Trace {
    fn new() -> Self {
        Self { logs: Vec::new() }
    }

    fn record(&mut self, stage: ParseStage, message: impl AsRef<str>) {
        self.logs.push(format!("[{stage:?}] {}", message.as_ref()));
    }
}

/// Row errors, capped so one broken column cannot flood the result.
struct RowErrors {
    reported: Vec<String>,
    suppressed: usize,
    limit: usize,
}

impl RowErrors {
    fn new(limit: usize) -> Self {
        Self {
            reported: Vec::new(),
            suppressed: 0,
            limit,
        }
    }

    fn push(&mut self, err: ParserError) {
        if self.reported.len() < self.limit {
            self.reported.push(err.to_string());
        } else {
            self.suppressed += 1;
        }
    }

    fn finish(mut self) -> Vec<String> {
        if self.suppressed > 0 {
            self.reported.push(
                ParserError::Suppressed {
                    suppressed: self.suppressed,
                }
                .to_string(),
            );
        }
        self.reported
    }
}

/// Parses one file into rows keyed by canonical UTC time.
///
/// Never fails: row problems are collected into `errors` and the offending
/// rows dropped, and an empty or unreadable file yields an empty result with
/// a single error.
pub fn parse_file(request: &ParseRequest<'_>, limits: &ParserLimits) -> ParseResult {
    let mut trace = Trace::new();
    let file_name = request.file_name.to_string();
    trace.record(
        ParseStage::Unopened,
        format!("{file_name}: {} bytes, family {}", request.content.len(), request.family),
    );

    let Ok(text) = std::str::from_utf8(request.content) else {
        let err = ParserError::Unreadable { file_name };
        trace.record(ParseStage::Unopened, err.to_string());
        return ParseResult::failed(err.to_string(), trace.logs);
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let lines = content_lines(text);
    if lines.is_empty() {
        let err = ParserError::Empty { file_name };
        trace.record(ParseStage::Unopened, err.to_string());
        return ParseResult::failed(err.to_string(), trace.logs);
    }

    let mut errors = Vec::new();

    let raw_lines: Vec<&str> = lines.iter().map(|(_, line)| *line).collect();
    let detection = detect_header_row(&raw_lines, request.family, limits);
    if detection.fell_back {
        trace.record(
            ParseStage::HeaderDetected,
            format!(
                "no header row found in the first {} lines; using line {}",
                limits.preamble_scan_limit, lines[0].0
            ),
        );
    } else if request.family.has_preamble() {
        trace.record(
            ParseStage::HeaderDetected,
            format!(
                "header row at line {} (matched {})",
                lines[detection.row_index].0,
                detection.matched.join(", ")
            ),
        );
    }

    let headers = unique_headers(parse_line(lines[detection.row_index].1));
    trace.record(
        ParseStage::HeaderDetected,
        format!("{} columns: {}", headers.len(), headers.join(" | ")),
    );

    let time_column = find_time_column(&headers, request.family);
    let time_index = time_column.index;
    let time_header = headers.get(time_index).cloned().unwrap_or_default();
    if time_column.matched_by == TimeColumnMatch::Fallback {
        errors.push(
            ParserError::MissingTimeColumn {
                family: request.family.to_string(),
                fallback: time_header.clone(),
            }
            .to_string(),
        );
    }
    trace.record(
        ParseStage::HeaderDetected,
        format!("time column '{time_header}' ({})", time_column.matched_by.as_str()),
    );

    let detected_sample_id_column =
        find_sample_id_column(&headers, time_index).map(|idx| headers[idx].clone());
    if let Some(column) = &detected_sample_id_column {
        trace.record(ParseStage::HeaderDetected, format!("sample id column '{column}'"));
    }

    let rows: Vec<(usize, Vec<String>)> = lines[detection.row_index + 1..]
        .iter()
        .map(|(line_no, line)| (*line_no, parse_line(line)))
        .collect();

    let date_format = match request.date_format_override {
        Some(format) => {
            trace.record(
                ParseStage::DateFormatResolved,
                format!("date format {format} (caller override)"),
            );
            format
        }
        None => {
            let sample: Vec<Vec<String>> = rows
                .iter()
                .take(limits.date_sample_size)
                .map(|(_, cells)| cells.clone())
                .collect();
            let decision = detect_date_format(&sample, time_index, limits);
            trace.record(
                ParseStage::DateFormatResolved,
                format!(
                    "date format {} by {} from {} samples",
                    decision.format,
                    decision.rule.as_str(),
                    decision.samples.len()
                ),
            );
            decision.format
        }
    };

    let mut row_errors = RowErrors::new(limits.max_reported_row_errors);
    let mut data = Vec::with_capacity(rows.len());
    for (line_index, cells) in &rows {
        let raw_time = cells
            .get(time_index)
            .map(String::as_str)
            .unwrap_or("")
            .trim();
        if raw_time.is_empty() {
            row_errors.push(ParserError::MissingTime {
                line_index: *line_index,
                column: time_header.clone(),
            });
            continue;
        }

        let Some(time) = normalize_time(raw_time, date_format) else {
            row_errors.push(ParserError::InvalidTime {
                line_index: *line_index,
                column: time_header.clone(),
                raw: raw_time.to_string(),
                format: date_format,
            });
            continue;
        };

        let mut point = ParsedDataPoint::new(time);
        for (idx, header) in headers.iter().enumerate() {
            if idx == time_index {
                continue;
            }
            let raw = cells.get(idx).map(String::as_str).unwrap_or("");
            point.values.insert(header.clone(), type_value(raw, header));
        }
        data.push(point);
    }

    let dropped = rows.len() - data.len();
    errors.extend(row_errors.finish());
    trace.record(
        ParseStage::RowsParsed,
        format!("{} of {} rows kept, {dropped} dropped", data.len(), rows.len()),
    );

    let stage = match sort_by_time(&mut data) {
        Ok(()) => {
            trace.record(ParseStage::Sorted, "rows sorted by time");
            ParseStage::Sorted
        }
        Err(err) => {
            trace.record(ParseStage::SortFailed, err.to_string());
            errors.push(err.to_string());
            ParseStage::SortFailed
        }
    };

    ParseResult {
        summary: ParseSummary {
            total_rows: rows.len(),
            valid_rows: data.len(),
            columns: headers.len(),
            time_column: time_header,
        },
        data,
        headers,
        errors,
        detected_sample_id_column,
        date_format: Some(date_format),
        stage,
        diagnostic_logs: trace.logs,
    }
}

/// Stable ascending sort on the parsed instant. Leaves `data` untouched if
/// any row's time cannot be read back.
fn sort_by_time(data: &mut Vec<ParsedDataPoint>) -> Result<(), ParserError> {
    let mut keyed = Vec::with_capacity(data.len());
    for point in data.iter() {
        let instant = parse_canonical(&point.time).ok_or_else(|| ParserError::SortKey {
            time: point.time.clone(),
        })?;
        keyed.push(instant);
    }

    let mut paired: Vec<_> = keyed.into_iter().zip(data.drain(..)).collect();
    paired.sort_by_key(|(instant, _)| *instant);
    data.extend(paired.into_iter().map(|(_, point)| point));
    Ok(())
}

/// Blank headers become `column_N`; repeats get `_2`, `_3`… suffixes.
fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            header
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while !seen.insert(name.clone()) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        headers.push(name);
    }
    headers
}
