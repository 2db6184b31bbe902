use serde::{Deserialize, Serialize};

pub const DEFAULT_DATE_SAMPLE_SIZE: usize = 20;
pub const DEFAULT_PREAMBLE_SCAN_LIMIT: usize = 10;
pub const DEFAULT_PREAMBLE_MIN_MATCHES: usize = 2;
pub const DEFAULT_AMBIGUITY_THRESHOLD: u32 = 12;
pub const DEFAULT_MIN_HEURISTIC_SAMPLES: usize = 4;
pub const DEFAULT_MAX_REPORTED_ROW_ERRORS: usize = 50;

/// Tunables of the parsing pipeline. Every field falls back to its default
/// when omitted from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserLimits {
    /// Data rows inspected when inferring the date format.
    pub date_sample_size: usize,
    /// Lines searched for a header row in preamble files.
    pub preamble_scan_limit: usize,
    /// Vocabulary hits a line needs to count as the header row.
    pub preamble_min_matches: usize,
    /// Largest value a month component can take.
    pub ambiguity_threshold: u32,
    /// Samples needed before the range/distinct-value heuristic is trusted.
    pub min_heuristic_samples: usize,
    pub max_reported_row_errors: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            date_sample_size: DEFAULT_DATE_SAMPLE_SIZE,
            preamble_scan_limit: DEFAULT_PREAMBLE_SCAN_LIMIT,
            preamble_min_matches: DEFAULT_PREAMBLE_MIN_MATCHES,
            ambiguity_threshold: DEFAULT_AMBIGUITY_THRESHOLD,
            min_heuristic_samples: DEFAULT_MIN_HEURISTIC_SAMPLES,
            max_reported_row_errors: DEFAULT_MAX_REPORTED_ROW_ERRORS,
        }
    }
}
