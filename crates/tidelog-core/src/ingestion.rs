use std::collections::HashMap;

use blake3::Hasher;
use futures::future::join_all;
use tidelog_parser::{
    parse_file, DateFormat, FileFamily, ParseRequest, ParseResult, ParsedFileData, ParserLimits,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FileInput {
    pub path: String,
    pub contents: Vec<u8>,
    /// Inferred from `path` when unset.
    pub family: Option<FileFamily>,
    pub date_format: Option<DateFormat>,
}

impl FileInput {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            family: None,
            date_format: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Duplicate,
    Parsed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub hash: String,
    pub status: FileStatus,
    pub family: FileFamily,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub errors: Vec<String>,
    /// Earlier file in the batch with the same contents.
    pub duplicate_of: Option<String>,
}

/// Outcome of a batch. `parsed` holds every non-duplicate file in input
/// order, failed ones included so their errors stay attached to them.
/// `reports` has one entry per input.
#[derive(Debug)]
pub struct IngestionBatch {
    pub parsed: Vec<ParsedFileData>,
    pub reports: Vec<FileReport>,
}

impl IngestionBatch {
    pub fn count(&self, status: FileStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }
}

struct PendingFile {
    path: String,
    hash: String,
    family: FileFamily,
}

enum Slot {
    Duplicate(FileReport),
    Parse(PendingFile),
}

/// Parses every input on the blocking pool and waits for all of them.
/// One file failing, even by panicking, never affects another.
pub async fn ingest_files(inputs: Vec<FileInput>, limits: ParserLimits) -> IngestionBatch {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut slots = Vec::with_capacity(inputs.len());
    let mut handles: Vec<JoinHandle<ParseResult>> = Vec::new();

    for input in inputs {
        let hash = compute_hash(&input.contents);
        let family = input
            .family
            .unwrap_or_else(|| FileFamily::infer(&input.path));

        if let Some(first) = seen.get(&hash) {
            warn!(path = %input.path, duplicate_of = %first, "skipping duplicate file");
            slots.push(Slot::Duplicate(FileReport {
                path: input.path,
                hash,
                status: FileStatus::Duplicate,
                family,
                total_rows: 0,
                valid_rows: 0,
                errors: Vec::new(),
                duplicate_of: Some(first.clone()),
            }));
            continue;
        }
        seen.insert(hash.clone(), input.path.clone());

        slots.push(Slot::Parse(PendingFile {
            path: input.path.clone(),
            hash,
            family,
        }));
        handles.push(tokio::task::spawn_blocking(move || {
            let request = ParseRequest::new(&input.path, &input.contents)
                .with_family(family)
                .with_date_format(input.date_format);
            parse_file(&request, &limits)
        }));
    }

    let mut results = join_all(handles).await.into_iter();
    let mut parsed = Vec::new();
    let mut reports = Vec::with_capacity(slots.len());

    for slot in slots {
        let pending = match slot {
            Slot::Duplicate(report) => {
                reports.push(report);
                continue;
            }
            Slot::Parse(pending) => pending,
        };

        let result = match results.next() {
            Some(Ok(result)) => result,
            Some(Err(err)) => ParseResult::failed(
                format!("{}: parse task failed: {err}", pending.path),
                Vec::new(),
            ),
            None => ParseResult::failed(
                format!("{}: parse task was never scheduled", pending.path),
                Vec::new(),
            ),
        };

        let report = report_for(&pending, &result);
        log_report(&report, &result);
        reports.push(report);
        parsed.push(ParsedFileData::new(pending.path, pending.family, result));
    }

    IngestionBatch { parsed, reports }
}

fn report_for(pending: &PendingFile, result: &ParseResult) -> FileReport {
    let status = if result.data.is_empty() {
        FileStatus::Failed
    } else {
        FileStatus::Parsed
    };
    FileReport {
        path: pending.path.clone(),
        hash: pending.hash.clone(),
        status,
        family: pending.family,
        total_rows: result.summary.total_rows,
        valid_rows: result.summary.valid_rows,
        errors: result.errors.clone(),
        duplicate_of: None,
    }
}

fn log_report(report: &FileReport, result: &ParseResult) {
    if let Some(format) = result.date_format {
        debug!(path = %report.path, date_format = %format, "resolved date format");
    }
    match report.status {
        FileStatus::Parsed => info!(
            path = %report.path,
            family = %report.family,
            valid_rows = report.valid_rows,
            total_rows = report.total_rows,
            "parsed file"
        ),
        _ => warn!(path = %report.path, family = %report.family, "file produced no rows"),
    }
    if !report.errors.is_empty() {
        warn!(path = %report.path, errors = report.errors.len(), "file reported errors");
    }
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    hasher.finalize().to_hex().to_string()
}
