use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The export family a file belongs to. Drives the header vocabularies used
/// to find the time column and, for metadata exports, the real header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileFamily {
    /// Acoustic loggers (FPOD/CPOD detection exports).
    Acoustic,
    /// Underwater camera annotation sheets.
    Camera,
    /// eDNA assay results.
    Edna,
    /// eDNA exports with a metadata preamble above the header row.
    EdnaMetadata,
    Generic,
}

const ACOUSTIC_TIME_COLUMNS: &[&str] = &["Time", "ChunkEnd", "Minute"];
const CAMERA_TIME_COLUMNS: &[&str] = &["DateTime", "Timestamp", "Recorded", "Capture Time"];
const EDNA_TIME_COLUMNS: &[&str] = &[
    "Date",
    "SampleDate",
    "Sample_Date",
    "CollectionDate",
    "Collection_Date",
    "DateCollected",
];
const GENERIC_TIME_COLUMNS: &[&str] = &["DateTime", "Timestamp"];

impl FileFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFamily::Acoustic => "acoustic",
            FileFamily::Camera => "camera",
            FileFamily::Edna => "edna",
            FileFamily::EdnaMetadata => "edna-meta",
            FileFamily::Generic => "generic",
        }
    }

    /// Guesses the family from a file name. The `meta` marker wins over every
    /// other signal since it changes where the header row lives.
    pub fn infer(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.contains("meta") {
            FileFamily::EdnaMetadata
        } else if lower.contains("edna") {
            FileFamily::Edna
        } else if ["fpod", "cpod", "acoustic", "pod"]
            .iter()
            .any(|marker| lower.contains(marker))
        {
            FileFamily::Acoustic
        } else if ["subcam", "camera", "cam"]
            .iter()
            .any(|marker| lower.contains(marker))
        {
            FileFamily::Camera
        } else {
            FileFamily::Generic
        }
    }

    pub fn has_preamble(&self) -> bool {
        matches!(self, FileFamily::EdnaMetadata)
    }

    /// Expected time-column names, most specific first.
    pub fn time_column_candidates(&self) -> &'static [&'static str] {
        match self {
            FileFamily::Acoustic => ACOUSTIC_TIME_COLUMNS,
            FileFamily::Camera => CAMERA_TIME_COLUMNS,
            FileFamily::Edna | FileFamily::EdnaMetadata => EDNA_TIME_COLUMNS,
            FileFamily::Generic => GENERIC_TIME_COLUMNS,
        }
    }
}

impl fmt::Display for FileFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFamily {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "acoustic" | "fpod" | "cpod" => Ok(FileFamily::Acoustic),
            "camera" | "subcam" => Ok(FileFamily::Camera),
            "edna" => Ok(FileFamily::Edna),
            "edna-meta" | "edna_meta" | "ednameta" | "meta" => Ok(FileFamily::EdnaMetadata),
            "generic" => Ok(FileFamily::Generic),
            other => Err(format!("unknown file family '{other}'")),
        }
    }
}
