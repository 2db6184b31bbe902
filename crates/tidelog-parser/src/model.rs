use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::family::FileFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateFormat {
    DayFirst,
    MonthFirst,
    Iso,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::DayFirst => "day-first",
            DateFormat::MonthFirst => "month-first",
            DateFormat::Iso => "iso",
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day-first" | "dayfirst" | "dd/mm/yyyy" | "dmy" => Ok(DateFormat::DayFirst),
            "month-first" | "monthfirst" | "mm/dd/yyyy" | "mdy" => Ok(DateFormat::MonthFirst),
            "iso" | "yyyy-mm-dd" | "ymd" => Ok(DateFormat::Iso),
            other => Err(format!("unknown date format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeMode {
    Sequential,
    StackParameters,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Sequential => "sequential",
            MergeMode::StackParameters => "stack-parameters",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(MergeMode::Sequential),
            "stack-parameters" | "stackparameters" | "stack" => Ok(MergeMode::StackParameters),
            other => Err(format!("unknown merge mode '{other}'")),
        }
    }
}

/// A typed cell. Serializes as a bare JSON `number`, `string` or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Null => Ok(()),
        }
    }
}

/// One row of a file: a canonical UTC instant plus its non-time cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDataPoint {
    pub time: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, CellValue>,
}

impl ParsedDataPoint {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub columns: usize,
    pub time_column: String,
}

/// Where a parse ended. `Sorted` and `SortFailed` are the terminal states of
/// a file that was read; `Unopened` marks an empty or unreadable file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseStage {
    #[default]
    Unopened,
    HeaderDetected,
    DateFormatResolved,
    RowsParsed,
    Sorted,
    SortFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub data: Vec<ParsedDataPoint>,
    pub headers: Vec<String>,
    pub errors: Vec<String>,
    pub summary: ParseSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_sample_id_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<DateFormat>,
    pub stage: ParseStage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostic_logs: Vec<String>,
}

impl ParseResult {
    /// Result for a file that never got past reading its bytes.
    pub fn failed(error: impl Into<String>, diagnostic_logs: Vec<String>) -> Self {
        Self {
            errors: vec![error.into()],
            diagnostic_logs,
            ..Self::default()
        }
    }

    pub fn time_column(&self) -> &str {
        &self.summary.time_column
    }

    /// Headers other than the time column, in file order.
    pub fn value_headers(&self) -> impl Iterator<Item = &str> {
        let time_column = self.summary.time_column.as_str();
        self.headers
            .iter()
            .map(String::as_str)
            .filter(move |header| *header != time_column)
    }
}

/// A parsed input as handed to the validator and merge engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFileData {
    pub file_name: String,
    pub family: FileFamily,
    pub result: ParseResult,
}

impl ParsedFileData {
    pub fn new(file_name: impl Into<String>, family: FileFamily, result: ParseResult) -> Self {
        Self {
            file_name: file_name.into(),
            family,
            result,
        }
    }

    /// File name without directories or extension.
    pub fn stem(&self) -> &str {
        let base = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file_name.as_str());
        match base.rfind('.') {
            Some(idx) if idx > 0 => &base[..idx],
            _ => base,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedData {
    pub headers: Vec<String>,
    pub data: Vec<ParsedDataPoint>,
}

impl MergedData {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
