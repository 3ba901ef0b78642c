use std::fs;

use dscan_report::{write_csv_report, write_xlsx_report};
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tempfile::TempDir;

fn sample_table() -> DataFrame {
    let columns: Vec<Column> = vec![
        Series::new(
            "Archivo".into(),
            vec!["scans/a.dcm".to_string(), "scans/b.dcm".to_string()],
        )
        .into_column(),
        Series::new(
            "IdentificadorPaciente".into(),
            vec![Some("A1".to_string()), None],
        )
        .into_column(),
        Series::new("IntensidadPromedio".into(), vec![Some(100.0f64), None]).into_column(),
    ];
    DataFrame::new(columns).unwrap()
}

fn empty_table() -> DataFrame {
    let columns: Vec<Column> = vec![
        Series::new("Archivo".into(), Vec::<String>::new()).into_column(),
        Series::new(
            "IdentificadorPaciente".into(),
            Vec::<Option<String>>::new(),
        )
        .into_column(),
        Series::new("IntensidadPromedio".into(), Vec::<Option<f64>>::new()).into_column(),
    ];
    DataFrame::new(columns).unwrap()
}

#[test]
fn csv_has_header_rows_and_empty_cells() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resultados_dicom.csv");
    let table = sample_table();

    write_csv_report(&path, &table).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Archivo,IdentificadorPaciente,IntensidadPromedio");
    assert_eq!(lines[1], "scans/a.dcm,A1,100.0");
    assert_eq!(lines[2], "scans/b.dcm,,");
}

#[test]
fn csv_of_empty_table_still_has_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resultados_dicom.csv");

    write_csv_report(&path, &empty_table()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text.trim_end(),
        "Archivo,IdentificadorPaciente,IntensidadPromedio"
    );
}

#[test]
fn csv_output_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let table = sample_table();

    write_csv_report(&first, &table).unwrap();
    write_csv_report(&second, &table).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn xlsx_is_written_as_a_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resultados_dicom.xlsx");

    write_xlsx_report(&path, &sample_table()).unwrap();

    let bytes = fs::read(&path).unwrap();
    // XLSX is a ZIP container.
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn writers_create_missing_output_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/out/resultados_dicom.csv");

    write_csv_report(&path, &sample_table()).unwrap();
    assert!(path.is_file());
}
