//! The fixed projection of header fields into output columns.

use dscan_dicom::{Tag, tags};

/// Column holding the source path of each record.
pub const PATH_COLUMN: &str = "Archivo";

/// Column holding the derived mean pixel intensity.
pub const INTENSITY_COLUMN: &str = "IntensidadPromedio";

/// One projected field: a source tag and its output column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectedField {
    pub tag: Tag,
    pub column: &'static str,
}

/// The fixed, ordered list of header fields selected for extraction.
///
/// Column names are unique and their order is stable across runs; the output
/// schema is derived from it and never depends on the data encountered.
#[derive(Debug, Clone)]
pub struct FieldProjection {
    fields: Vec<ProjectedField>,
}

impl FieldProjection {
    /// The standard projection of the batch report.
    pub fn standard() -> Self {
        Self {
            fields: vec![
                ProjectedField {
                    tag: tags::PATIENT_ID,
                    column: "IdentificadorPaciente",
                },
                ProjectedField {
                    tag: tags::PATIENT_NAME,
                    column: "NombrePaciente",
                },
                ProjectedField {
                    tag: tags::STUDY_INSTANCE_UID,
                    column: "UIDEstudio",
                },
                ProjectedField {
                    tag: tags::STUDY_DESCRIPTION,
                    column: "DescripcionEstudio",
                },
                ProjectedField {
                    tag: tags::STUDY_DATE,
                    column: "FechaEstudio",
                },
                ProjectedField {
                    tag: tags::MODALITY,
                    column: "Modalidad",
                },
                ProjectedField {
                    tag: tags::ROWS,
                    column: "Filas",
                },
                ProjectedField {
                    tag: tags::COLUMNS,
                    column: "Columnas",
                },
            ],
        }
    }

    /// Projected fields in declaration order.
    pub fn fields(&self) -> &[ProjectedField] {
        &self.fields
    }

    /// Number of projected fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Full output schema: path column, projected columns, intensity column.
    pub fn schema(&self) -> Vec<&'static str> {
        let mut columns = Vec::with_capacity(self.fields.len() + 2);
        columns.push(PATH_COLUMN);
        columns.extend(self.fields.iter().map(|field| field.column));
        columns.push(INTENSITY_COLUMN);
        columns
    }
}

impl Default for FieldProjection {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_standard_schema() {
        let projection = FieldProjection::standard();
        assert_eq!(
            projection.schema(),
            vec![
                "Archivo",
                "IdentificadorPaciente",
                "NombrePaciente",
                "UIDEstudio",
                "DescripcionEstudio",
                "FechaEstudio",
                "Modalidad",
                "Filas",
                "Columnas",
                "IntensidadPromedio",
            ]
        );
    }

    #[test]
    fn test_columns_are_unique() {
        let projection = FieldProjection::standard();
        let unique: BTreeSet<&str> = projection.schema().into_iter().collect();
        assert_eq!(unique.len(), projection.len() + 2);
    }

    #[test]
    fn test_schema_is_stable() {
        assert_eq!(
            FieldProjection::standard().schema(),
            FieldProjection::standard().schema()
        );
    }
}
