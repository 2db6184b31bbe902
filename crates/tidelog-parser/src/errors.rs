use thiserror::Error;

use crate::model::DateFormat;

/// Failures raised while parsing a single file.
///
/// None of these cross a file boundary as an `Err`: the parser renders them
/// into the `errors` list of the file's [`ParseResult`](crate::ParseResult).
#[derive(Debug, Clone, Error)]
pub enum ParserError {
    #[error("{file_name}: file is not valid UTF-8 text and could not be read")]
    Unreadable { file_name: String },

    #[error("{file_name}: file is empty")]
    Empty { file_name: String },

    #[error("row {line_index}: invalid time value '{raw}' in column '{column}' (tried {format})")]
    InvalidTime {
        line_index: usize,
        column: String,
        raw: String,
        format: DateFormat,
    },

    #[error("row {line_index}: missing time value in column '{column}'")]
    MissingTime { line_index: usize, column: String },

    #[error("no time column matched the {family} vocabulary; falling back to column 0 ('{fallback}')")]
    MissingTimeColumn { family: String, fallback: String },

    #[error("could not sort rows by time: '{time}' is not a valid instant; rows kept in file order")]
    SortKey { time: String },

    #[error("{suppressed} further row errors were not reported")]
    Suppressed { suppressed: usize },
}
