//! Result table assembly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dscan_dicom::DicomObject;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use crate::extract::extract_fields;
use crate::intensity::mean_intensity;
use crate::projection::{FieldProjection, INTENSITY_COLUMN, PATH_COLUMN};

/// Assemble the result table from loaded records.
///
/// One row per record, in input order. The table is built column-wise from
/// the declared projection, so every declared column exists with its
/// declared type and position even when the record list is empty — the
/// schema never depends on the data encountered.
pub fn build_result_table(
    records: &[(PathBuf, DicomObject)],
    projection: &FieldProjection,
) -> Result<DataFrame> {
    let mut paths: Vec<String> = Vec::with_capacity(records.len());
    let mut field_values: Vec<Vec<Option<String>>> =
        (0..projection.len()).map(|_| Vec::new()).collect();
    let mut intensities: Vec<Option<f64>> = Vec::with_capacity(records.len());

    for (path, record) in records {
        paths.push(path.display().to_string());
        for (idx, (_column, value)) in extract_fields(record, projection).into_iter().enumerate() {
            field_values[idx].push(value);
        }
        intensities.push(mean_intensity(record));
    }

    let mut columns: Vec<Column> = Vec::with_capacity(projection.len() + 2);
    columns.push(Series::new(PATH_COLUMN.into(), paths).into_column());
    for (field, values) in projection.fields().iter().zip(field_values) {
        columns.push(Series::new(field.column.into(), values).into_column());
    }
    columns.push(Series::new(INTENSITY_COLUMN.into(), intensities).into_column());

    DataFrame::new(columns).context("assemble result table")
}

#[cfg(test)]
mod tests {
    use dscan_dicom::tags;
    use dscan_dicom::{DataElement, ElementValue, FileMeta, TransferSyntax, Vr};
    use polars::prelude::AnyValue;

    use super::*;

    fn text_element(tag: dscan_dicom::Tag, vr: Vr, text: &str) -> DataElement {
        DataElement {
            tag,
            vr,
            value: ElementValue::Text(text.to_string()),
        }
    }

    fn record_with(elements: Vec<DataElement>) -> DicomObject {
        DicomObject::from_elements(
            FileMeta::default(),
            TransferSyntax::ExplicitVrLittleEndian,
            elements,
        )
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let projection = FieldProjection::standard();
        let df = build_result_table(&[], &projection).unwrap();

        assert_eq!(df.height(), 0);
        let names: Vec<&str> = df.get_column_names_str();
        assert_eq!(names, projection.schema());
    }

    #[test]
    fn test_one_row_per_record_in_order() {
        let projection = FieldProjection::standard();
        let records = vec![
            (
                PathBuf::from("a.dcm"),
                record_with(vec![text_element(tags::PATIENT_ID, Vr::Lo, "A1")]),
            ),
            (
                PathBuf::from("b.dcm"),
                record_with(vec![text_element(tags::PATIENT_ID, Vr::Lo, "B2")]),
            ),
        ];
        let df = build_result_table(&records, &projection).unwrap();

        assert_eq!(df.height(), 2);
        let archivo = df.column("Archivo").unwrap();
        assert_eq!(archivo.get(0).unwrap(), AnyValue::String("a.dcm"));
        assert_eq!(archivo.get(1).unwrap(), AnyValue::String("b.dcm"));
    }

    #[test]
    fn test_absent_fields_are_null() {
        let projection = FieldProjection::standard();
        let records = vec![(
            PathBuf::from("a.dcm"),
            record_with(vec![text_element(tags::MODALITY, Vr::Cs, "MR")]),
        )];
        let df = build_result_table(&records, &projection).unwrap();

        assert_eq!(
            df.column("Modalidad").unwrap().get(0).unwrap(),
            AnyValue::String("MR")
        );
        assert_eq!(
            df.column("IdentificadorPaciente").unwrap().get(0).unwrap(),
            AnyValue::Null
        );
        assert_eq!(
            df.column("IntensidadPromedio").unwrap().get(0).unwrap(),
            AnyValue::Null
        );
    }

    #[test]
    fn test_intensity_column_holds_mean() {
        let projection = FieldProjection::standard();
        let mut elements = vec![
            DataElement {
                tag: tags::ROWS,
                vr: Vr::Us,
                value: ElementValue::Unsigned(vec![2]),
            },
            DataElement {
                tag: tags::COLUMNS,
                vr: Vr::Us,
                value: ElementValue::Unsigned(vec![2]),
            },
            DataElement {
                tag: tags::BITS_ALLOCATED,
                vr: Vr::Us,
                value: ElementValue::Unsigned(vec![8]),
            },
        ];
        elements.push(DataElement {
            tag: tags::PIXEL_DATA,
            vr: Vr::Ow,
            value: ElementValue::Bytes(vec![100; 4]),
        });
        let records = vec![(PathBuf::from("a.dcm"), record_with(elements))];
        let df = build_result_table(&records, &projection).unwrap();

        assert_eq!(
            df.column("IntensidadPromedio").unwrap().get(0).unwrap(),
            AnyValue::Float64(100.0)
        );
    }
}
