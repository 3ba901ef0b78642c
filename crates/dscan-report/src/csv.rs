//! Delimited-text report output.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};

/// Write the result table as a UTF-8 CSV file.
///
/// The header row uses the column names verbatim, absent values become empty
/// cells and no index column is added. Row order matches the table.
pub fn write_csv_report(path: &Path, table: &DataFrame) -> Result<()> {
    create_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut table = table.clone();
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut table)
        .with_context(|| format!("write csv {}", path.display()))?;
    Ok(())
}

pub(crate) fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}
