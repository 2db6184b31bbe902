use polars::prelude::*;
use tidelog_parser::merge::MERGED_TIME_HEADER;
use tidelog_parser::time::parse_canonical;
use tidelog_parser::{CellValue, MergedData, ParseResult, ParsedDataPoint};

use crate::error::{CoreError, Result};

/// One parsed file as a frame: `time` first, then the value columns in file
/// order.
pub fn result_to_dataframe(result: &ParseResult) -> Result<DataFrame> {
    let columns: Vec<&str> = result.value_headers().collect();
    rows_to_dataframe(&columns, &result.data)
}

pub fn merged_to_dataframe(merged: &MergedData) -> Result<DataFrame> {
    let columns: Vec<&str> = merged
        .headers
        .iter()
        .map(String::as_str)
        .filter(|header| *header != MERGED_TIME_HEADER)
        .collect();
    rows_to_dataframe(&columns, &merged.data)
}

fn rows_to_dataframe(columns: &[&str], rows: &[ParsedDataPoint]) -> Result<DataFrame> {
    let mut millis = Vec::with_capacity(rows.len());
    for row in rows {
        let instant = parse_canonical(&row.time).ok_or_else(|| {
            CoreError::Validation(format!("row time '{}' is not canonical", row.time))
        })?;
        millis.push(instant.timestamp_millis());
    }

    let time = Series::new(MERGED_TIME_HEADER.into(), millis).cast(&DataType::Datetime(
        TimeUnit::Milliseconds,
        Some(polars::prelude::TimeZone::UTC),
    ))?;

    let mut frame_columns: Vec<Column> = Vec::with_capacity(columns.len() + 1);
    frame_columns.push(time.into());
    for name in columns {
        frame_columns.push(value_series(name, rows).into());
    }

    Ok(DataFrame::new(frame_columns)?)
}

/// Float64 when every present cell is a number, String otherwise. Nulls and
/// missing cells stay null either way.
fn value_series(name: &str, rows: &[ParsedDataPoint]) -> Series {
    let cells: Vec<Option<&CellValue>> = rows.iter().map(|row| row.get(name)).collect();
    let numeric = cells
        .iter()
        .all(|cell| matches!(cell, None | Some(CellValue::Null) | Some(CellValue::Number(_))));

    if numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.and_then(CellValue::as_f64))
            .collect();
        Series::new(name.into(), values)
    } else {
        let owned: Vec<Option<String>> = cells
            .iter()
            .map(|cell| match cell {
                None | Some(CellValue::Null) => None,
                Some(value) => Some(value.to_string()),
            })
            .collect();
        let values: Vec<Option<&str>> = owned.iter().map(|v| v.as_deref()).collect();
        Series::new(name.into(), values)
    }
}
