//! Field projection, intensity statistics and result-table assembly.
//!
//! Takes parsed records from `dscan-dicom` and turns them into the fixed
//! ten-column result table the report writers consume.

pub mod extract;
pub mod intensity;
pub mod projection;
pub mod table;

pub use extract::extract_fields;
pub use intensity::{mean_intensity, nan_aware_mean};
pub use projection::{FieldProjection, INTENSITY_COLUMN, PATH_COLUMN, ProjectedField};
pub use table::build_result_table;
