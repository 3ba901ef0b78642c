//! Spreadsheet report output.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::Workbook;

/// Write the result table as an XLSX workbook with a single worksheet.
///
/// Schema and row order are identical to the delimited output; numeric cells
/// are written as numbers, absent values as blank cells.
pub fn write_xlsx_report(path: &Path, table: &DataFrame) -> Result<()> {
    crate::csv::create_parent_dir(path)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, name) in table.get_column_names_str().iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *name)
            .with_context(|| format!("write header {name}"))?;
    }

    for (col_idx, column) in table.get_columns().iter().enumerate() {
        let col = col_idx as u16;
        for row_idx in 0..table.height() {
            let row = row_idx as u32 + 1;
            let value = column.get(row_idx).unwrap_or(AnyValue::Null);
            match value {
                AnyValue::Null => {}
                AnyValue::Float64(v) => {
                    worksheet
                        .write_number(row, col, v)
                        .with_context(|| format!("write cell ({row},{col})"))?;
                }
                AnyValue::Float32(v) => {
                    worksheet
                        .write_number(row, col, f64::from(v))
                        .with_context(|| format!("write cell ({row},{col})"))?;
                }
                AnyValue::String(text) => {
                    worksheet
                        .write_string(row, col, text)
                        .with_context(|| format!("write cell ({row},{col})"))?;
                }
                AnyValue::StringOwned(text) => {
                    worksheet
                        .write_string(row, col, text.as_str())
                        .with_context(|| format!("write cell ({row},{col})"))?;
                }
                other => {
                    worksheet
                        .write_string(row, col, other.to_string())
                        .with_context(|| format!("write cell ({row},{col})"))?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("write xlsx {}", path.display()))?;
    Ok(())
}
