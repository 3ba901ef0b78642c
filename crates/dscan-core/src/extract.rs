//! Per-record field extraction.

use dscan_dicom::DicomObject;

use crate::projection::FieldProjection;

/// Extract the projected fields of a record as display strings.
///
/// The result always has one entry per projected column, in projection
/// order. A field that is absent from the record, or whose value has no text
/// rendering, yields `None` for its column alone; other columns are
/// unaffected.
pub fn extract_fields(
    record: &DicomObject,
    projection: &FieldProjection,
) -> Vec<(&'static str, Option<String>)> {
    projection
        .fields()
        .iter()
        .map(|field| (field.column, record.display_string(field.tag)))
        .collect()
}
