use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::model::DateFormat;

/// Canonical rendering of every normalized instant.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 2100;

const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
const MILLIS_PER_DAY: f64 = 86_400_000.0;
// 9999-12-31 as an Excel serial day.
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, Copy)]
enum Shape {
    IsoDateTime,
    IsoSpaced,
    YearFirstSlash,
    SlashWithSeconds,
    SlashWithMinutes,
    IsoDate,
    SlashDateLongYear,
    SlashDateShortYear,
    ExcelSerial,
}

static PATTERNS: Lazy<Vec<(Shape, Regex)>> = Lazy::new(|| {
    let table: [(Shape, &str); 9] = [
        (
            Shape::IsoDateTime,
            r"^(\d{4})-(\d{1,2})-(\d{1,2})T(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?Z?$",
        ),
        (
            Shape::IsoSpaced,
            r"^(\d{4})-(\d{1,2})-(\d{1,2})\s+(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?Z?$",
        ),
        (
            Shape::YearFirstSlash,
            r"^(\d{4})/(\d{1,2})/(\d{1,2})(?:[\sT]+(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?$",
        ),
        (
            Shape::SlashWithSeconds,
            r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\s+(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d{1,9}))?$",
        ),
        (
            Shape::SlashWithMinutes,
            r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\s+(\d{1,2}):(\d{2})$",
        ),
        (Shape::IsoDate, r"^(\d{4})-(\d{1,2})-(\d{1,2})$"),
        (Shape::SlashDateLongYear, r"^(\d{1,2})/(\d{1,2})/(\d{4})$"),
        (Shape::SlashDateShortYear, r"^(\d{1,2})/(\d{1,2})/(\d{2})$"),
        (Shape::ExcelSerial, r"^\d+(?:\.\d+)?$"),
    ];
    table
        .into_iter()
        .map(|(shape, pattern)| (shape, Regex::new(pattern).expect("static time pattern")))
        .collect()
});

/// Calendar fields exactly as written in the source token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Literal {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millis: u32,
}

/// Converts a raw time cell into `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// `format` only matters for day/month ambiguous slash dates. Returns `None`
/// when nothing matches or the result is not a real calendar instant.
pub fn normalize_time(raw: &str, format: DateFormat) -> Option<String> {
    let token = raw.trim().trim_matches('"').trim();
    if token.is_empty() {
        return None;
    }

    let (shape, caps) = PATTERNS
        .iter()
        .find_map(|(shape, regex)| regex.captures(token).map(|caps| (*shape, caps)))?;

    let literal = match shape {
        Shape::IsoDateTime | Shape::IsoSpaced | Shape::YearFirstSlash | Shape::IsoDate => {
            year_first(&caps)?
        }
        Shape::SlashWithSeconds
        | Shape::SlashWithMinutes
        | Shape::SlashDateLongYear
        | Shape::SlashDateShortYear => day_month(&caps, format)?,
        Shape::ExcelSerial => return excel_serial(token),
    };

    validate(literal)
}

/// Parses a canonical string back into an instant.
pub fn parse_canonical(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn year_first(caps: &Captures<'_>) -> Option<Literal> {
    Some(Literal {
        year: number(caps, 1)? as i32,
        month: number(caps, 2)?,
        day: number(caps, 3)?,
        hour: number(caps, 4).unwrap_or(0),
        minute: number(caps, 5).unwrap_or(0),
        second: number(caps, 6).unwrap_or(0),
        millis: fraction_millis(caps, 7),
    })
}

fn day_month(caps: &Captures<'_>, format: DateFormat) -> Option<Literal> {
    let first = number(caps, 1)?;
    let second = number(caps, 2)?;
    let (day, month) = match format {
        DateFormat::MonthFirst => (second, first),
        DateFormat::DayFirst | DateFormat::Iso => (first, second),
    };

    let year_text = caps.get(3)?.as_str();
    let mut year = year_text.parse::<i32>().ok()?;
    if year_text.len() == 2 && year < 100 {
        year += 2000;
    }

    Some(Literal {
        year,
        month,
        day,
        hour: number(caps, 4).unwrap_or(0),
        minute: number(caps, 5).unwrap_or(0),
        second: number(caps, 6).unwrap_or(0),
        millis: fraction_millis(caps, 7),
    })
}

fn excel_serial(token: &str) -> Option<String> {
    let serial = token.parse::<f64>().ok()?;
    if !serial.is_finite() || serial < 0.0 || serial > EXCEL_MAX_SERIAL {
        return None;
    }

    let (year, month, day) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let offset = Duration::try_milliseconds((serial * MILLIS_PER_DAY).round() as i64)?;
    let instant = epoch.checked_add_signed(offset)?.and_utc();

    let literal = Literal {
        year: instant.year(),
        month: instant.month(),
        day: instant.day(),
        hour: 0,
        minute: 0,
        second: 0,
        millis: 0,
    };
    check_calendar(&literal)?;
    Some(instant.format(CANONICAL_FORMAT).to_string())
}

/// Builds the candidate string from the literal fields and accepts it only if
/// it parses, lands in the supported year range, and still carries the
/// literal month and day (no silent rollover into the next month).
fn validate(literal: Literal) -> Option<String> {
    check_calendar(&literal)?;
    if literal.hour > 23 || literal.minute > 59 || literal.second > 59 {
        return None;
    }

    let candidate = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        literal.year,
        literal.month,
        literal.day,
        literal.hour,
        literal.minute,
        literal.second,
        literal.millis
    );
    let instant = parse_canonical(&candidate)?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&instant.year()) {
        return None;
    }
    if instant.month() != literal.month || instant.day() != literal.day {
        return None;
    }

    Some(instant.format(CANONICAL_FORMAT).to_string())
}

fn check_calendar(literal: &Literal) -> Option<()> {
    let in_range = (MIN_YEAR..=MAX_YEAR).contains(&literal.year)
        && (1..=12).contains(&literal.month)
        && (1..=31).contains(&literal.day);
    in_range.then_some(())
}

fn number(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse::<u32>().ok()
}

fn fraction_millis(caps: &Captures<'_>, idx: usize) -> u32 {
    caps.get(idx)
        .map(|m| {
            let digits: String = m.as_str().chars().chain("000".chars()).take(3).collect();
            digits.parse::<u32>().unwrap_or(0)
        })
        .unwrap_or(0)
}
