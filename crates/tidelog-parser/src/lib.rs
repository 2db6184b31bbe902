pub mod columns;
pub mod dates;
pub mod errors;
pub mod export;
pub mod family;
pub mod header;
pub mod limits;
pub mod merge;
pub mod model;
mod parser;
pub mod time;
pub mod tokenizer;
pub mod values;

pub use dates::{detect_date_format, DateFormatDecision, DateFormatRule};
pub use errors::ParserError;
pub use export::to_csv;
pub use family::FileFamily;
pub use limits::ParserLimits;
pub use merge::{merge_files, validate_merge};
pub use model::{
    CellValue, DateFormat, FileValidationResult, MergeMode, MergedData, ParseResult, ParseStage,
    ParseSummary, ParsedDataPoint, ParsedFileData,
};
pub use parser::{parse_file, ParseRequest};
pub use time::normalize_time;
pub use tokenizer::parse_line;
