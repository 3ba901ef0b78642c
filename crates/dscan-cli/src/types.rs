use std::path::PathBuf;

/// Per-file outcome of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Valid record, contributes a row.
    Loaded,
    /// Not a record of the target format; excluded silently.
    Skipped,
    /// Classified as a record but the full parse failed.
    Failed { reason: String },
}

/// One enumerated candidate and what happened to it.
#[derive(Debug)]
pub struct FileSummary {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Modality of the loaded record, for the console summary.
    pub modality: Option<String>,
}

/// Outcome of a whole batch run.
#[derive(Debug)]
pub struct ScanResult {
    pub input_dir: PathBuf,
    /// The input folder was created by this run; no scan happened.
    pub created_input_dir: bool,
    pub files: Vec<FileSummary>,
    /// Rows in the assembled result table.
    pub row_count: usize,
    /// CSV artifact path, when written.
    pub csv: Option<PathBuf>,
    /// XLSX artifact path, when written.
    pub xlsx: Option<PathBuf>,
    /// Artifact write failures; the in-memory table survives them.
    pub errors: Vec<String>,
    pub has_errors: bool,
}
