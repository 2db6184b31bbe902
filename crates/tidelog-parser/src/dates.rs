use std::collections::BTreeSet;

use crate::limits::ParserLimits;
use crate::model::DateFormat;

/// Which inference rule settled the format. Rules are tried in declaration
/// order and the first that fires wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormatRule {
    /// A dashed date with a four-digit year up front.
    IsoSeparator,
    /// The first slash component exceeded the month range.
    FirstComponentExceedsMonth,
    /// The second slash component exceeded the month range.
    SecondComponentExceedsMonth,
    /// Both components stayed in month range; the more varied one is the day.
    VariationHeuristic,
    /// Nothing conclusive.
    Default,
}

impl DateFormatRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormatRule::IsoSeparator => "ISO year-first separator",
            DateFormatRule::FirstComponentExceedsMonth => "first component exceeds month range",
            DateFormatRule::SecondComponentExceedsMonth => "second component exceeds month range",
            DateFormatRule::VariationHeuristic => "range/distinct-value heuristic",
            DateFormatRule::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatDecision {
    pub format: DateFormat,
    pub rule: DateFormatRule,
    /// Date substrings that were inspected.
    pub samples: Vec<String>,
}

impl DateFormatDecision {
    fn new(format: DateFormat, rule: DateFormatRule, samples: Vec<String>) -> Self {
        Self {
            format,
            rule,
            samples,
        }
    }
}

/// Infers how the slash dates of a file are ordered from a sample of its
/// data rows, starting at the first data row.
pub fn detect_date_format(
    rows: &[Vec<String>],
    time_index: usize,
    limits: &ParserLimits,
) -> DateFormatDecision {
    let samples: Vec<String> = rows
        .iter()
        .take(limits.date_sample_size)
        .filter_map(|row| row.get(time_index))
        .map(|cell| date_part(cell).to_string())
        .filter(|date| !date.is_empty())
        .collect();

    if samples.iter().any(|date| is_iso_date(date)) {
        return DateFormatDecision::new(DateFormat::Iso, DateFormatRule::IsoSeparator, samples);
    }

    let pairs: Vec<(u32, u32)> = samples.iter().filter_map(|date| slash_pair(date)).collect();
    let threshold = limits.ambiguity_threshold;
    let first_exceeds = pairs.iter().any(|(first, _)| *first > threshold);
    let second_exceeds = pairs.iter().any(|(_, second)| *second > threshold);

    if first_exceeds && !second_exceeds {
        return DateFormatDecision::new(
            DateFormat::DayFirst,
            DateFormatRule::FirstComponentExceedsMonth,
            samples,
        );
    }
    if second_exceeds && !first_exceeds {
        return DateFormatDecision::new(
            DateFormat::MonthFirst,
            DateFormatRule::SecondComponentExceedsMonth,
            samples,
        );
    }

    if !first_exceeds && !second_exceeds && pairs.len() >= limits.min_heuristic_samples {
        let firsts: Vec<u32> = pairs.iter().map(|(first, _)| *first).collect();
        let seconds: Vec<u32> = pairs.iter().map(|(_, second)| *second).collect();
        let (first_range, first_distinct) = variation(&firsts);
        let (second_range, second_distinct) = variation(&seconds);

        if first_range > second_range && first_distinct > second_distinct {
            return DateFormatDecision::new(
                DateFormat::DayFirst,
                DateFormatRule::VariationHeuristic,
                samples,
            );
        }
        if second_range > first_range && second_distinct > first_distinct {
            return DateFormatDecision::new(
                DateFormat::MonthFirst,
                DateFormatRule::VariationHeuristic,
                samples,
            );
        }
    }

    DateFormatDecision::new(DateFormat::DayFirst, DateFormatRule::Default, samples)
}

/// The date portion of a timestamp token: everything before a `T` or
/// whitespace that introduces the time of day.
pub(crate) fn date_part(token: &str) -> &str {
    let trimmed = token.trim();
    let end = trimmed
        .char_indices()
        .find(|(idx, ch)| ch.is_whitespace() || (*ch == 'T' && *idx > 0))
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

fn is_iso_date(date: &str) -> bool {
    let mut parts = date.split('-');
    match (parts.next(), parts.next()) {
        (Some(year), Some(_)) => year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// `(first, second)` components of an ambiguous slash date. Year-first slash
/// dates are not ambiguous and yield nothing.
fn slash_pair(date: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() != 3 || parts[0].len() == 4 {
        return None;
    }
    let first = parts[0].parse::<u32>().ok()?;
    let second = parts[1].parse::<u32>().ok()?;
    Some((first, second))
}

fn variation(values: &[u32]) -> (u32, usize) {
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    let distinct: BTreeSet<u32> = values.iter().copied().collect();
    (max - min, distinct.len())
}
