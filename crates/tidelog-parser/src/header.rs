use crate::family::FileFamily;
use crate::limits::ParserLimits;

/// Column-name fragments expected on the header row of assay exports that
/// carry a metadata preamble.
pub const CONCENTRATION_VOCABULARY: &[&str] = &[
    "concentration",
    "copies",
    "ng/ul",
    "ng/µl",
    "cq",
    "dna",
    "target",
    "assay",
    "detection",
    "replicate",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDetection {
    /// Index into the file's non-blank lines.
    pub row_index: usize,
    /// Vocabulary entries found on the chosen line.
    pub matched: Vec<&'static str>,
    /// True when no line qualified and row 0 was used anyway.
    pub fell_back: bool,
}

impl HeaderDetection {
    fn first_row() -> Self {
        Self {
            row_index: 0,
            matched: Vec::new(),
            fell_back: false,
        }
    }
}

pub fn detect_header_row(lines: &[&str], family: FileFamily, limits: &ParserLimits) -> HeaderDetection {
    if !family.has_preamble() {
        return HeaderDetection::first_row();
    }

    for (idx, line) in lines.iter().take(limits.preamble_scan_limit).enumerate() {
        let matched = vocabulary_hits(line);
        if matched.len() >= limits.preamble_min_matches {
            return HeaderDetection {
                row_index: idx,
                matched,
                fell_back: false,
            };
        }
    }

    HeaderDetection {
        fell_back: true,
        ..HeaderDetection::first_row()
    }
}

fn vocabulary_hits(line: &str) -> Vec<&'static str> {
    let lower = line.to_lowercase();
    CONCENTRATION_VOCABULARY
        .iter()
        .copied()
        .filter(|term| lower.contains(term))
        .collect()
}
