//! Derived mean pixel intensity.

use dscan_dicom::DicomObject;
use tracing::debug;

/// NaN-aware arithmetic mean of every pixel sample in a record.
///
/// Absent when the record has no pixel buffer, the buffer is empty, every
/// sample is NaN, or the payload cannot be decoded. The buffer is flattened
/// across all axes (frames, rows, columns, channels) before averaging, so
/// the result is insensitive to reshaping.
pub fn mean_intensity(record: &DicomObject) -> Option<f64> {
    let buffer = match record.pixel_buffer() {
        Ok(Some(buffer)) => buffer,
        Ok(None) => return None,
        Err(error) => {
            debug!(%error, "pixel buffer not decodable");
            return None;
        }
    };
    nan_aware_mean(buffer.samples.iter_f64())
}

/// Mean of the non-NaN samples of an iterator; `None` when there are none.
pub fn nan_aware_mean(samples: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for sample in samples {
        if sample.is_nan() {
            continue;
        }
        sum += sample;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
