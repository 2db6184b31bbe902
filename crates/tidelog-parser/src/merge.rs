use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{
    CellValue, FileValidationResult, MergeMode, MergedData, ParsedDataPoint, ParsedFileData,
};

/// Name of the time column in every merged dataset.
pub const MERGED_TIME_HEADER: &str = "time";

/// Checks whether `files` can be merged under `mode` without merging them.
///
/// Errors block the merge; warnings describe what the merge will do with
/// imperfect inputs. Inputs are only read, so this is safe to call on every
/// mode toggle of a preview.
pub fn validate_merge(files: &[ParsedFileData], mode: MergeMode) -> FileValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if files.len() < 2 {
        errors.push(format!(
            "select at least two files to merge ({} selected)",
            files.len()
        ));
    }

    for file in files {
        if file.result.summary.time_column.is_empty() {
            errors.push(format!("{}: no time column detected", file.file_name));
        }
        if file.result.data.is_empty() {
            errors.push(format!("{}: no valid rows to merge", file.file_name));
        }
    }

    match mode {
        MergeMode::Sequential => sequential_warnings(files, &mut warnings),
        MergeMode::StackParameters => {
            for file in files {
                if file.result.value_headers().next().is_none() {
                    errors.push(format!(
                        "{}: no parameter columns besides '{}' to stack",
                        file.file_name,
                        file.result.time_column()
                    ));
                }
            }
            if errors.is_empty() {
                stack_warnings(files, &mut warnings);
            }
        }
    }

    FileValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn sequential_warnings(files: &[ParsedFileData], warnings: &mut Vec<String>) {
    let column_sets: Vec<BTreeSet<&str>> = files
        .iter()
        .map(|file| file.result.value_headers().collect())
        .collect();
    if column_sets.windows(2).any(|pair| pair[0] != pair[1]) {
        warnings.push(
            "files have different columns; cells missing from a file will be empty".to_string(),
        );
    }

    let mut previous: Option<(&str, &str)> = None;
    for file in files {
        let (Some(first), Some(last)) = (file.result.data.first(), file.result.data.last()) else {
            continue;
        };
        if let Some((prev_name, prev_end)) = previous {
            if first.time.as_str() < prev_end {
                warnings.push(format!(
                    "{} starts at {} before {} ends at {}; merged rows will not be in time order",
                    file.file_name, first.time, prev_name, prev_end
                ));
            }
        }
        previous = Some((file.file_name.as_str(), last.time.as_str()));
    }
}

fn stack_warnings(files: &[ParsedFileData], warnings: &mut Vec<String>) {
    if files.is_empty() {
        return;
    }
    let shared = common_timestamps(files);
    let largest = files.iter().map(|f| f.result.data.len()).max().unwrap_or(0);
    let smallest = files.iter().map(|f| f.result.data.len()).min().unwrap_or(0);

    if shared.is_empty() {
        warnings.push(format!(
            "files share no timestamps; rows will be paired by position ({smallest} rows)"
        ));
        if smallest != largest {
            warnings.push(format!(
                "row counts differ ({smallest} to {largest}); rows beyond {smallest} will be dropped"
            ));
        }
    } else if shared.len() < largest {
        warnings.push(format!(
            "only {} of {largest} timestamps are shared by every file; unshared rows will be dropped",
            shared.len()
        ));
    }
}

/// Combines parsed files into one dataset. Never fails; no input yields an
/// empty dataset.
pub fn merge_files(files: &[ParsedFileData], mode: MergeMode) -> MergedData {
    if files.is_empty() {
        return MergedData::default();
    }
    match mode {
        MergeMode::Sequential => merge_sequential(files),
        MergeMode::StackParameters => merge_stacked(files),
    }
}

fn merge_sequential(files: &[ParsedFileData]) -> MergedData {
    let mut headers = vec![MERGED_TIME_HEADER.to_string()];
    let mut seen: HashSet<&str> = HashSet::new();
    for file in files {
        for header in file.result.value_headers() {
            if seen.insert(header) {
                headers.push(header.to_string());
            }
        }
    }

    let data = files
        .iter()
        .flat_map(|file| file.result.data.iter().cloned())
        .collect();

    MergedData { headers, data }
}

fn merge_stacked(files: &[ParsedFileData]) -> MergedData {
    let qualified = qualified_headers(files);
    let mut headers = vec![MERGED_TIME_HEADER.to_string()];
    headers.extend(qualified.iter().flatten().map(|(_, name)| name.clone()));

    let shared = common_timestamps(files);
    let data = if shared.is_empty() {
        align_by_position(files, &qualified)
    } else {
        align_by_time(files, &qualified, &shared)
    };

    MergedData { headers, data }
}

/// Per file, `(source column, merged column)` pairs.
type QualifiedColumns = Vec<Vec<(String, String)>>;

fn qualified_headers(files: &[ParsedFileData]) -> QualifiedColumns {
    let mut taken: HashSet<String> = HashSet::new();
    taken.insert(MERGED_TIME_HEADER.to_string());

    files
        .iter()
        .map(|file| {
            file.result
                .value_headers()
                .map(|column| {
                    let base = format!("{column} ({})", file.stem());
                    let mut name = base.clone();
                    let mut suffix = 2;
                    while !taken.insert(name.clone()) {
                        name = format!("{base} #{suffix}");
                        suffix += 1;
                    }
                    (column.to_string(), name)
                })
                .collect()
        })
        .collect()
}

/// Timestamps present in every file, ascending.
pub fn common_timestamps(files: &[ParsedFileData]) -> BTreeSet<String> {
    let mut iter = files.iter();
    let Some(first) = iter.next() else {
        return BTreeSet::new();
    };
    let mut shared: BTreeSet<String> = first.result.data.iter().map(|p| p.time.clone()).collect();
    for file in iter {
        let times: HashSet<&str> = file.result.data.iter().map(|p| p.time.as_str()).collect();
        shared.retain(|time| times.contains(time.as_str()));
    }
    shared
}

fn align_by_time(
    files: &[ParsedFileData],
    qualified: &QualifiedColumns,
    shared: &BTreeSet<String>,
) -> Vec<ParsedDataPoint> {
    // First row per timestamp wins when a file repeats one.
    let indexes: Vec<HashMap<&str, &ParsedDataPoint>> = files
        .iter()
        .map(|file| {
            let mut index = HashMap::new();
            for point in &file.result.data {
                index.entry(point.time.as_str()).or_insert(point);
            }
            index
        })
        .collect();

    shared
        .iter()
        .map(|time| {
            let mut row = ParsedDataPoint::new(time.clone());
            for (index, columns) in indexes.iter().zip(qualified) {
                let source = index.get(time.as_str()).copied();
                copy_columns(&mut row, source, columns);
            }
            row
        })
        .collect()
}

fn align_by_position(files: &[ParsedFileData], qualified: &QualifiedColumns) -> Vec<ParsedDataPoint> {
    let rows = files
        .iter()
        .map(|file| file.result.data.len())
        .min()
        .unwrap_or(0);

    (0..rows)
        .map(|i| {
            let mut row = ParsedDataPoint::new(files[0].result.data[i].time.clone());
            for (file, columns) in files.iter().zip(qualified) {
                copy_columns(&mut row, file.result.data.get(i), columns);
            }
            row
        })
        .collect()
}

fn copy_columns(row: &mut ParsedDataPoint, source: Option<&ParsedDataPoint>, columns: &[(String, String)]) {
    for (column, merged) in columns {
        let value = source
            .and_then(|point| point.values.get(column))
            .cloned()
            .unwrap_or(CellValue::Null);
        row.values.insert(merged.clone(), value);
    }
}
