use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::Table;

use dscan_cli::pipeline::{ScanConfig, run_scan as run_pipeline};
use dscan_cli::types::ScanResult;
use dscan_core::FieldProjection;

use crate::cli::{OutputFormatArg, ScanArgs};
use crate::summary::apply_table_style;

pub fn run_fields() -> Result<()> {
    let projection = FieldProjection::standard();
    let mut table = Table::new();
    table.set_header(vec!["Tag", "Column"]);
    apply_table_style(&mut table);
    for field in projection.fields() {
        table.add_row(vec![field.tag.to_string(), field.column.to_string()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_scan(args: &ScanArgs) -> Result<ScanResult> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.folder));

    let want_csv = matches!(args.format, OutputFormatArg::Csv | OutputFormatArg::Both);
    let want_xlsx = matches!(args.format, OutputFormatArg::Xlsx | OutputFormatArg::Both);

    let csv = want_csv.then(|| {
        args.csv
            .clone()
            .unwrap_or_else(|| output_dir.join("resultados_dicom.csv"))
    });
    let xlsx = want_xlsx.then(|| {
        args.xlsx
            .clone()
            .unwrap_or_else(|| output_dir.join("resultados_dicom.xlsx"))
    });

    let config = ScanConfig {
        folder: args.folder.clone(),
        csv,
        xlsx,
        dry_run: args.dry_run,
    };
    run_pipeline(&config)
}

/// Reports land next to the scanned folder, never inside it, so a re-run
/// does not enumerate its own artifacts.
fn default_output_dir(folder: &Path) -> PathBuf {
    match folder.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
