use crate::family::FileFamily;
use crate::values::is_identifier_header;

const GENERIC_TIME_TOKENS: &[&str] = &["time", "date"];

/// How the time column was found, most to least confident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeColumnMatch {
    Exact,
    Substring,
    GenericToken,
    Fallback,
}

impl TimeColumnMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeColumnMatch::Exact => "exact name",
            TimeColumnMatch::Substring => "name fragment",
            TimeColumnMatch::GenericToken => "generic time/date token",
            TimeColumnMatch::Fallback => "fallback to first column",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeColumn {
    pub index: usize,
    pub matched_by: TimeColumnMatch,
}

pub fn find_time_column(headers: &[String], family: FileFamily) -> TimeColumn {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let candidates = family.time_column_candidates();

    for candidate in candidates {
        let candidate = candidate.to_lowercase();
        if let Some(index) = lowered.iter().position(|h| *h == candidate) {
            return TimeColumn {
                index,
                matched_by: TimeColumnMatch::Exact,
            };
        }
    }

    for candidate in candidates {
        let candidate = candidate.to_lowercase();
        if let Some(index) = lowered.iter().position(|h| h.contains(&candidate)) {
            return TimeColumn {
                index,
                matched_by: TimeColumnMatch::Substring,
            };
        }
    }

    if let Some(index) = lowered
        .iter()
        .position(|h| GENERIC_TIME_TOKENS.iter().any(|token| h.contains(token)))
    {
        return TimeColumn {
            index,
            matched_by: TimeColumnMatch::GenericToken,
        };
    }

    TimeColumn {
        index: 0,
        matched_by: TimeColumnMatch::Fallback,
    }
}

/// First non-time identifier column, the same one the value typer keeps as
/// text.
pub fn find_sample_id_column(headers: &[String], time_index: usize) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .find(|(idx, header)| *idx != time_index && is_identifier_header(header))
        .map(|(idx, _)| idx)
}
