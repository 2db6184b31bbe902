use tidelog_core::ingestion::{ingest_files, FileInput, FileStatus};
use tidelog_parser::{DateFormat, FileFamily, ParserLimits};

fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tidelog-parser/tests/data")
        .join(name);
    std::fs::read(path).expect("read fixture")
}

#[tokio::test]
async fn ingestion_parses_new_file() {
    let inputs = vec![FileInput::new("FPOD_Station3_2025.csv", fixture("FPOD_Station3_2025.csv"))];

    let batch = ingest_files(inputs, ParserLimits::default()).await;

    assert_eq!(batch.parsed.len(), 1);
    assert_eq!(batch.reports.len(), 1);
    let report = &batch.reports[0];
    assert_eq!(report.status, FileStatus::Parsed);
    assert_eq!(report.family, FileFamily::Acoustic);
    assert_eq!(report.total_rows, 5);
    assert_eq!(report.valid_rows, 4);
    assert_eq!(report.hash.len(), 64);
    assert_eq!(batch.parsed[0].result.date_format, Some(DateFormat::DayFirst));
}

#[tokio::test]
async fn malformed_file_does_not_affect_its_neighbours() {
    let inputs = vec![
        FileInput::new("FPOD_Station3_2025.csv", fixture("FPOD_Station3_2025.csv")),
        FileInput::new("broken.csv", vec![0xff, 0xfe, 0x00, 0x80, 0x81]),
        FileInput::new(
            "subcam_ambiguous_golden.csv",
            fixture("subcam_ambiguous_golden.csv"),
        ),
    ];

    let batch = ingest_files(inputs, ParserLimits::default()).await;

    let paths: Vec<&str> = batch.reports.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        ["FPOD_Station3_2025.csv", "broken.csv", "subcam_ambiguous_golden.csv"]
    );
    assert_eq!(batch.reports[0].status, FileStatus::Parsed);
    assert_eq!(batch.reports[1].status, FileStatus::Failed);
    assert_eq!(batch.reports[2].status, FileStatus::Parsed);

    assert_eq!(batch.parsed.len(), 3);
    assert_eq!(batch.parsed[0].result.data.len(), 4);
    assert!(batch.parsed[1].result.data.is_empty());
    assert_eq!(batch.parsed[1].result.errors.len(), 1);
    assert!(batch.parsed[1].result.errors[0].contains("broken.csv"));
    assert_eq!(batch.parsed[2].result.data.len(), 5);
    assert!(batch.parsed[2].result.errors.is_empty());
}

#[tokio::test]
async fn ingestion_marks_duplicate() {
    let content = fixture("subcam_ambiguous_golden.csv");
    let inputs = vec![
        FileInput::new("day1/subcam.csv", content.clone()),
        FileInput::new("day2/subcam_copy.csv", content),
    ];

    let batch = ingest_files(inputs, ParserLimits::default()).await;

    assert_eq!(batch.parsed.len(), 1);
    assert_eq!(batch.count(FileStatus::Parsed), 1);
    assert_eq!(batch.count(FileStatus::Duplicate), 1);
    let duplicate = &batch.reports[1];
    assert_eq!(duplicate.status, FileStatus::Duplicate);
    assert_eq!(duplicate.duplicate_of.as_deref(), Some("day1/subcam.csv"));
    assert_eq!(duplicate.hash, batch.reports[0].hash);
}

#[tokio::test]
async fn explicit_family_and_date_format_override_inference() {
    let mut input = FileInput::new(
        "subcam_ambiguous_golden.csv",
        fixture("subcam_ambiguous_golden.csv"),
    );
    input.family = Some(FileFamily::Generic);
    input.date_format = Some(DateFormat::DayFirst);

    let batch = ingest_files(vec![input], ParserLimits::default()).await;

    let parsed = &batch.parsed[0];
    assert_eq!(parsed.family, FileFamily::Generic);
    assert_eq!(parsed.result.date_format, Some(DateFormat::DayFirst));
    assert_eq!(parsed.result.data[0].time, "2025-01-04T08:00:00.000Z");
}

#[tokio::test]
async fn empty_batch_yields_empty_reports() {
    let batch = ingest_files(Vec::new(), ParserLimits::default()).await;
    assert!(batch.parsed.is_empty());
    assert!(batch.reports.is_empty());
}
