//! Integration tests for the scan pipeline.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use dscan_cli::pipeline::{ScanConfig, run_scan};
use dscan_cli::types::FileOutcome;

const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

/// Pad character data to even length with a space.
fn text(value: &str) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    if bytes.len() % 2 != 0 {
        bytes.push(b' ');
    }
    bytes
}

/// Pad a UID to even length with a NUL.
fn uid(value: &str) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    bytes
}

fn push_short(buf: &mut Vec<u8>, group: u16, element: u16, vr: &[u8; 2], value: &[u8]) {
    buf.extend_from_slice(&group.to_le_bytes());
    buf.extend_from_slice(&element.to_le_bytes());
    buf.extend_from_slice(vr);
    buf.extend_from_slice(&u16::try_from(value.len()).unwrap().to_le_bytes());
    buf.extend_from_slice(value);
}

fn push_long(buf: &mut Vec<u8>, group: u16, element: u16, vr: &[u8; 2], value: &[u8]) {
    buf.extend_from_slice(&group.to_le_bytes());
    buf.extend_from_slice(&element.to_le_bytes());
    buf.extend_from_slice(vr);
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(&u32::try_from(value.len()).unwrap().to_le_bytes());
    buf.extend_from_slice(value);
}

fn part10_prefix(transfer_syntax: &str) -> Vec<u8> {
    let mut meta = Vec::new();
    push_short(&mut meta, 0x0002, 0x0010, b"UI", &uid(transfer_syntax));

    let mut buf = vec![0u8; 128];
    buf.extend_from_slice(b"DICM");
    push_short(
        &mut buf,
        0x0002,
        0x0000,
        b"UL",
        &u32::try_from(meta.len()).unwrap().to_le_bytes(),
    );
    buf.extend_from_slice(&meta);
    buf
}

/// Valid record: PatientID "A1", 512x512 8-bit buffer of constant 100.
fn record_with_pixels() -> Vec<u8> {
    let mut buf = part10_prefix(EXPLICIT_VR_LE);
    push_short(&mut buf, 0x0008, 0x0060, b"CS", &text("CT"));
    push_short(&mut buf, 0x0010, 0x0020, b"LO", &text("A1"));
    push_short(&mut buf, 0x0028, 0x0010, b"US", &512u16.to_le_bytes());
    push_short(&mut buf, 0x0028, 0x0011, b"US", &512u16.to_le_bytes());
    push_short(&mut buf, 0x0028, 0x0100, b"US", &8u16.to_le_bytes());
    push_long(&mut buf, 0x7FE0, 0x0010, b"OW", &vec![100u8; 512 * 512]);
    buf
}

/// Valid record with no PatientID and no pixel buffer.
fn record_without_pixels() -> Vec<u8> {
    let mut buf = part10_prefix(EXPLICIT_VR_LE);
    push_short(&mut buf, 0x0008, 0x0020, b"DA", &text("20230102"));
    push_short(&mut buf, 0x0008, 0x0060, b"CS", &text("MR"));
    buf
}

fn populate_input_dir(dir: &Path) {
    fs::write(dir.join("scan1.dcm"), record_with_pixels()).unwrap();
    fs::write(dir.join("notes.txt"), b"just a text file, not an image").unwrap();
    fs::write(dir.join("scan2.dcm"), record_without_pixels()).unwrap();
}

fn scan_config(input: &Path, output: &Path) -> ScanConfig {
    ScanConfig {
        folder: input.to_path_buf(),
        csv: Some(output.join("resultados_dicom.csv")),
        xlsx: Some(output.join("resultados_dicom.xlsx")),
        dry_run: false,
    }
}

#[test]
fn end_to_end_three_file_scenario() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    populate_input_dir(input.path());

    let result = run_scan(&scan_config(input.path(), output.path())).unwrap();

    assert!(!result.created_input_dir);
    assert_eq!(result.row_count, 2);
    assert!(result.errors.is_empty());
    assert!(!result.has_errors);
    assert_eq!(result.files.len(), 3);

    let outcome_of = |name: &str| {
        result
            .files
            .iter()
            .find(|f| f.path.file_name().unwrap() == name)
            .map(|f| f.outcome.clone())
            .unwrap()
    };
    assert_eq!(outcome_of("scan1.dcm"), FileOutcome::Loaded);
    assert_eq!(outcome_of("scan2.dcm"), FileOutcome::Loaded);
    assert_eq!(outcome_of("notes.txt"), FileOutcome::Skipped);

    let csv_path = result.csv.expect("csv written");
    let content = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Archivo,IdentificadorPaciente,NombrePaciente,UIDEstudio,DescripcionEstudio,\
         FechaEstudio,Modalidad,Filas,Columnas,IntensidadPromedio"
    );

    // Row 1: the record with pixels; constant buffer of 100 averages to 100.
    let path1 = input.path().join("scan1.dcm").display().to_string();
    let row1: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(row1[0], path1);
    assert_eq!(row1[1], "A1");
    assert_eq!(row1[6], "CT");
    assert_eq!(row1[7], "512");
    assert_eq!(row1[8], "512");
    assert_eq!(row1[9], "100.0");

    // Row 2: no PatientID, no pixel buffer; those cells stay absent while
    // the rest of the row is populated.
    let path2 = input.path().join("scan2.dcm").display().to_string();
    let row2: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(row2[0], path2);
    assert_eq!(row2[1], "");
    assert_eq!(row2[5], "20230102");
    assert_eq!(row2[6], "MR");
    assert_eq!(row2[9], "");

    // Every loaded file appears exactly once.
    let archivo_cells: Vec<&str> = lines[1..].iter().map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(archivo_cells, vec![path1.as_str(), path2.as_str()]);

    let xlsx_path = result.xlsx.expect("xlsx written");
    assert!(fs::read(&xlsx_path).unwrap().starts_with(b"PK"));
}

#[test]
fn empty_folder_produces_header_only_artifacts() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let result = run_scan(&scan_config(input.path(), output.path())).unwrap();

    assert_eq!(result.row_count, 0);
    assert!(result.files.is_empty());

    let content = fs::read_to_string(result.csv.expect("csv written")).unwrap();
    assert_eq!(
        content.trim_end(),
        "Archivo,IdentificadorPaciente,NombrePaciente,UIDEstudio,DescripcionEstudio,\
         FechaEstudio,Modalidad,Filas,Columnas,IntensidadPromedio"
    );
}

#[test]
fn missing_folder_is_created_and_run_short_circuits() {
    let base = TempDir::new().unwrap();
    let folder = base.path().join("dicoms");
    let config = ScanConfig {
        folder: folder.clone(),
        csv: Some(base.path().join("resultados_dicom.csv")),
        xlsx: Some(base.path().join("resultados_dicom.xlsx")),
        dry_run: false,
    };

    let result = run_scan(&config).unwrap();

    assert!(result.created_input_dir);
    assert!(folder.is_dir());
    assert_eq!(result.row_count, 0);
    assert!(result.csv.is_none());
    assert!(result.xlsx.is_none());
    assert!(!base.path().join("resultados_dicom.csv").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    populate_input_dir(input.path());

    let mut config = scan_config(input.path(), output.path());
    config.dry_run = true;
    let result = run_scan(&config).unwrap();

    assert_eq!(result.row_count, 2);
    assert!(result.csv.is_none());
    assert!(result.xlsx.is_none());
    assert!(!output.path().join("resultados_dicom.csv").exists());
    assert!(!output.path().join("resultados_dicom.xlsx").exists());
}

#[test]
fn rerun_produces_byte_identical_csv() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    populate_input_dir(input.path());
    let config = scan_config(input.path(), output.path());

    run_scan(&config).unwrap();
    let first = fs::read(output.path().join("resultados_dicom.csv")).unwrap();

    run_scan(&config).unwrap();
    let second = fs::read(output.path().join("resultados_dicom.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn corrupt_record_is_skipped_without_aborting() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    populate_input_dir(input.path());

    // Valid header, data set truncated mid-element: classification passes
    // on the header prefix, the deep parse fails.
    let mut bytes = record_with_pixels();
    bytes.truncate(bytes.len() - 100);
    fs::write(input.path().join("scan3.dcm"), bytes).unwrap();

    let result = run_scan(&scan_config(input.path(), output.path())).unwrap();

    assert_eq!(result.row_count, 2);
    let failed = result
        .files
        .iter()
        .find(|f| f.path.file_name().unwrap() == "scan3.dcm")
        .unwrap();
    assert!(matches!(failed.outcome, FileOutcome::Failed { .. }));
    // Artifact writes still succeeded.
    assert!(result.errors.is_empty());
}
