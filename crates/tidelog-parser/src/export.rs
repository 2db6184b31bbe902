use csv::WriterBuilder;

use crate::merge::MERGED_TIME_HEADER;
use crate::model::{MergedData, ParseResult, ParsedDataPoint};

/// Writes rows back to CSV text: a header line, then one line per row with
/// the `time_header` cell taken from the row's canonical time.
pub fn to_csv(
    headers: &[String],
    time_header: &str,
    rows: &[ParsedDataPoint],
) -> Result<String, csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        let record = headers.iter().map(|header| {
            if header == time_header {
                row.time.clone()
            } else {
                row.values
                    .get(header)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            }
        });
        writer.write_record(record)?;
    }

    let bytes = writer.into_inner().map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl ParseResult {
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        to_csv(&self.headers, &self.summary.time_column, &self.data)
    }
}

impl MergedData {
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        to_csv(&self.headers, MERGED_TIME_HEADER, &self.data)
    }
}
