use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dscan_cli::types::{FileOutcome, FileSummary, ScanResult};

pub fn print_summary(result: &ScanResult) {
    if result.created_input_dir {
        println!("Created input folder: {}", result.input_dir.display());
        println!("Add DICOM files to it and run the scan again.");
        return;
    }

    println!("Folder: {}", result.input_dir.display());
    if let Some(path) = &result.csv {
        println!("CSV: {}", path.display());
    }
    if let Some(path) = &result.xlsx {
        println!("XLSX: {}", path.display());
    }

    if result.files.is_empty() {
        println!("No candidate files found.");
    } else {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("File"),
            header_cell("Status"),
            header_cell("Modality"),
            header_cell("Detail"),
        ]);
        apply_summary_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Center);
        align_column(&mut table, 2, CellAlignment::Center);

        let mut loaded = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;
        for file in &result.files {
            table.add_row(file_row(file, &mut loaded, &mut skipped, &mut failed));
        }
        table.add_row(vec![
            Cell::new("TOTAL")
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{loaded} loaded")).add_attribute(Attribute::Bold),
            dim_cell(format!("{skipped} skipped")),
            count_cell(failed, Color::Red),
        ]);
        println!("{table}");
    }

    println!("Rows written: {}", result.row_count);
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

fn file_row(
    file: &FileSummary,
    loaded: &mut usize,
    skipped: &mut usize,
    failed: &mut usize,
) -> Vec<Cell> {
    let name = file.path.display().to_string();
    match &file.outcome {
        FileOutcome::Loaded => {
            *loaded += 1;
            vec![
                Cell::new(name),
                Cell::new("loaded")
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                Cell::new(file.modality.clone().unwrap_or_else(|| "-".to_string())),
                dim_cell("-"),
            ]
        }
        FileOutcome::Skipped => {
            *skipped += 1;
            vec![
                dim_cell(name),
                dim_cell("skipped"),
                dim_cell("-"),
                dim_cell("not a DICOM record"),
            ]
        }
        FileOutcome::Failed { reason } => {
            *failed += 1;
            vec![
                Cell::new(name),
                Cell::new("failed").fg(Color::Red),
                dim_cell("-"),
                Cell::new(reason.clone()).fg(Color::Red),
            ]
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(format!("{count} failed"))
            .fg(color)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("0 failed")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
