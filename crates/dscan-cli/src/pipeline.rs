//! Batch scan pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Bootstrap**: ensure the input folder exists
//! 2. **Ingest**: enumerate candidate files
//! 3. **Load**: classify each candidate and fully parse the records
//! 4. **Assemble**: build the fixed-schema result table
//! 5. **Output**: write the CSV and XLSX artifacts
//!
//! Each stage takes the output of the previous stage and returns typed
//! results. Per-file failures degrade to a skipped file or an absent cell;
//! only artifact write failures surface to the operator.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use dscan_core::{FieldProjection, build_result_table};
use dscan_dicom::{DicomObject, read_file, read_header, tags};
use dscan_ingest::list_files;
use dscan_report::{write_csv_report, write_xlsx_report};

use crate::logging::redact_value;
use crate::types::{FileOutcome, FileSummary, ScanResult};

/// Explicit configuration of one batch run, supplied by the caller.
///
/// Nothing is resolved from the execution context here; defaults live with
/// the CLI argument layer.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Input folder to enumerate.
    pub folder: PathBuf,
    /// CSV artifact path, `None` to skip that artifact.
    pub csv: Option<PathBuf>,
    /// XLSX artifact path, `None` to skip that artifact.
    pub xlsx: Option<PathBuf>,
    /// Classify, load and assemble, but write nothing.
    pub dry_run: bool,
}

/// Run the whole pipeline for one configuration.
pub fn run_scan(config: &ScanConfig) -> Result<ScanResult> {
    let scan_span = info_span!("scan", folder = %config.folder.display());
    let _scan_guard = scan_span.enter();

    // =========================================================================
    // Stage 1: Bootstrap - ensure the input folder exists
    // =========================================================================
    if bootstrap_input_dir(&config.folder)? {
        // Folder created just now: nothing to scan yet, signal "no input"
        // rather than an error.
        return Ok(ScanResult {
            input_dir: config.folder.clone(),
            created_input_dir: true,
            files: Vec::new(),
            row_count: 0,
            csv: None,
            xlsx: None,
            errors: Vec::new(),
            has_errors: false,
        });
    }

    // =========================================================================
    // Stage 2: Ingest - enumerate candidates
    // =========================================================================
    let candidates = ingest(&config.folder)?;

    // =========================================================================
    // Stage 3: Load - classify and parse
    // =========================================================================
    let LoadOutput { records, files } = load_records(&candidates);

    // =========================================================================
    // Stage 4: Assemble - build the result table
    // =========================================================================
    let projection = FieldProjection::standard();
    let table = assemble(&records, &projection)?;

    // =========================================================================
    // Stage 5: Output - write artifacts
    // =========================================================================
    let output = if config.dry_run {
        info!("output skipped (dry run)");
        OutputResult::default()
    } else {
        write_outputs(OutputRequest {
            table: &table,
            csv: config.csv.as_deref(),
            xlsx: config.xlsx.as_deref(),
        })
    };

    let has_errors = !output.errors.is_empty();
    Ok(ScanResult {
        input_dir: config.folder.clone(),
        created_input_dir: false,
        files,
        row_count: table.height(),
        csv: output.csv,
        xlsx: output.xlsx,
        errors: output.errors,
        has_errors,
    })
}

// ============================================================================
// Stage 1: Bootstrap
// ============================================================================

/// Ensure the input folder exists, creating it when absent.
///
/// Returns true when the folder was created by this call; the run then
/// short-circuits so the operator can add files first.
pub fn bootstrap_input_dir(folder: &Path) -> Result<bool> {
    if folder.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(folder).with_context(|| format!("create {}", folder.display()))?;
    info!(folder = %folder.display(), "created input folder; add files and run again");
    Ok(true)
}

// ============================================================================
// Stage 2: Ingest
// ============================================================================

/// Enumerate every candidate file under the input folder.
pub fn ingest(folder: &Path) -> Result<Vec<PathBuf>> {
    let ingest_span = info_span!("ingest", folder = %folder.display());
    let _ingest_guard = ingest_span.enter();
    let ingest_start = Instant::now();

    let candidates = list_files(folder).context("list candidate files")?;

    info!(
        candidate_count = candidates.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(candidates)
}

// ============================================================================
// Stage 3: Load
// ============================================================================

/// Result of classifying and loading the candidates.
#[derive(Debug)]
pub struct LoadOutput {
    /// Successfully loaded records in enumeration order.
    pub records: Vec<(PathBuf, DicomObject)>,
    /// Per-file outcomes for the console summary.
    pub files: Vec<FileSummary>,
}

/// Classify each candidate and fully parse the records.
///
/// Classification reads only the header. Candidates that fail it contribute
/// no row and are logged at debug level. A candidate that passes
/// classification but fails the full parse is logged at warn level and
/// skipped; one bad file never aborts the batch.
pub fn load_records(candidates: &[PathBuf]) -> LoadOutput {
    let load_span = info_span!("load");
    let _load_guard = load_span.enter();
    let load_start = Instant::now();

    let mut records: Vec<(PathBuf, DicomObject)> = Vec::new();
    let mut files: Vec<FileSummary> = Vec::new();
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for path in candidates {
        if let Err(error) = read_header(path) {
            debug!(path = %path.display(), %error, "not a DICOM record, skipped");
            skipped += 1;
            files.push(FileSummary {
                path: path.clone(),
                outcome: FileOutcome::Skipped,
                modality: None,
            });
            continue;
        }

        // The shallow check passing does not guarantee the deep parse will.
        match read_file(path) {
            Ok(record) => {
                let patient_id = record
                    .display_string(tags::PATIENT_ID)
                    .unwrap_or_default();
                debug!(
                    path = %path.display(),
                    patient_id = %redact_value(&patient_id),
                    element_count = record.element_count(),
                    "record loaded"
                );
                let modality = record.display_string(tags::MODALITY);
                files.push(FileSummary {
                    path: path.clone(),
                    outcome: FileOutcome::Loaded,
                    modality,
                });
                records.push((path.clone(), record));
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "record failed to load, skipped");
                failed += 1;
                files.push(FileSummary {
                    path: path.clone(),
                    outcome: FileOutcome::Failed {
                        reason: error.to_string(),
                    },
                    modality: None,
                });
            }
        }
    }

    info!(
        loaded = records.len(),
        skipped,
        failed,
        duration_ms = load_start.elapsed().as_millis(),
        "load complete"
    );
    LoadOutput { records, files }
}

// ============================================================================
// Stage 4: Assemble
// ============================================================================

/// Build the result table from the loaded records.
pub fn assemble(
    records: &[(PathBuf, DicomObject)],
    projection: &FieldProjection,
) -> Result<DataFrame> {
    let assemble_span = info_span!("assemble");
    let _assemble_guard = assemble_span.enter();
    let assemble_start = Instant::now();

    let table = build_result_table(records, projection)?;

    info!(
        row_count = table.height(),
        column_count = table.width(),
        duration_ms = assemble_start.elapsed().as_millis(),
        "assemble complete"
    );
    Ok(table)
}

// ============================================================================
// Stage 5: Output
// ============================================================================

/// Artifact targets of the output stage.
pub struct OutputRequest<'a> {
    pub table: &'a DataFrame,
    pub csv: Option<&'a Path>,
    pub xlsx: Option<&'a Path>,
}

/// Result of the output stage.
#[derive(Debug, Default)]
pub struct OutputResult {
    pub csv: Option<PathBuf>,
    pub xlsx: Option<PathBuf>,
    /// Write failures; the in-memory table is unaffected by them.
    pub errors: Vec<String>,
}

/// Write the requested artifacts.
///
/// Each write is attempted independently: a failing CSV write does not
/// prevent the XLSX write, and vice versa.
pub fn write_outputs(request: OutputRequest<'_>) -> OutputResult {
    let output_span = info_span!("output");
    let _output_guard = output_span.enter();
    let output_start = Instant::now();
    let mut errors = Vec::new();

    let csv = request.csv.and_then(|path| {
        match write_csv_report(path, request.table) {
            Ok(()) => Some(path.to_path_buf()),
            Err(error) => {
                warn!(path = %path.display(), %error, "csv write failed");
                errors.push(format!("csv: {error}"));
                None
            }
        }
    });

    let xlsx = request.xlsx.and_then(|path| {
        match write_xlsx_report(path, request.table) {
            Ok(()) => Some(path.to_path_buf()),
            Err(error) => {
                warn!(path = %path.display(), %error, "xlsx write failed");
                errors.push(format!("xlsx: {error}"));
                None
            }
        }
    });

    info!(
        csv_written = csv.is_some(),
        xlsx_written = xlsx.is_some(),
        error_count = errors.len(),
        duration_ms = output_start.elapsed().as_millis(),
        "output complete"
    );
    OutputResult { csv, xlsx, errors }
}
