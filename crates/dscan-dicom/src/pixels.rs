//! Pixel payload decoding.
//!
//! Turns the raw bytes of a pixel element into a typed numeric buffer using
//! the image pixel module tags (Rows, Columns, BitsAllocated,
//! PixelRepresentation, SamplesPerPixel, NumberOfFrames).

use crate::error::{DicomError, Result};
use crate::tags;
use crate::types::{DicomObject, ElementValue};

/// Numeric samples of a decoded pixel buffer, kept in their stored type.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelSamples {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelSamples {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every sample as `f64`, all axes flattened.
    pub fn iter_f64(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Self::U8(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::I8(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::U16(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::I16(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::U32(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::I32(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::F32(v) => Box::new(v.iter().map(|&s| f64::from(s))),
            Self::F64(v) => Box::new(v.iter().copied()),
        }
    }
}

/// A decoded pixel buffer with its geometry.
///
/// The sample vector is stored flat in frame, row, column, sample order; the
/// dimensions are descriptive only.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub frames: usize,
    pub rows: usize,
    pub columns: usize,
    pub samples_per_pixel: usize,
    pub samples: PixelSamples,
}

impl PixelBuffer {
    /// Total number of samples across every axis.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

enum PayloadKind {
    Integer,
    Float32,
    Float64,
}

impl DicomObject {
    /// Decode the pixel payload into a numeric buffer.
    ///
    /// Returns `Ok(None)` when the object carries no pixel element. Errors
    /// cover encapsulated streams, missing image pixel module tags,
    /// unsupported bit depths and payloads shorter than the declared
    /// geometry.
    pub fn pixel_buffer(&self) -> Result<Option<PixelBuffer>> {
        let (element, kind) = if let Some(element) = self.get(tags::PIXEL_DATA) {
            (element, PayloadKind::Integer)
        } else if let Some(element) = self.get(tags::FLOAT_PIXEL_DATA) {
            (element, PayloadKind::Float32)
        } else if let Some(element) = self.get(tags::DOUBLE_FLOAT_PIXEL_DATA) {
            (element, PayloadKind::Float64)
        } else {
            return Ok(None);
        };

        let empty: &[u8] = &[];
        let bytes: &[u8] = match &element.value {
            ElementValue::Bytes(bytes) => bytes,
            ElementValue::Encapsulated => {
                return Err(DicomError::UnsupportedPixelEncoding {
                    uid: self.transfer_syntax().uid().to_string(),
                });
            }
            ElementValue::Empty => empty,
            _ => {
                return Err(DicomError::invalid_format(format!(
                    "pixel element {} is not binary",
                    element.tag
                )));
            }
        };

        let rows = usize::from(self.ushort(tags::ROWS).ok_or(DicomError::MissingPixelTag {
            tag: tags::ROWS,
        })?);
        let columns = usize::from(self.ushort(tags::COLUMNS).ok_or(
            DicomError::MissingPixelTag {
                tag: tags::COLUMNS,
            },
        )?);
        let samples_per_pixel =
            usize::from(self.ushort(tags::SAMPLES_PER_PIXEL).unwrap_or(1)).max(1);
        let frames = self
            .text(tags::NUMBER_OF_FRAMES)
            .and_then(|text| text.trim().parse::<usize>().ok())
            .filter(|&frames| frames > 0)
            .unwrap_or(1);

        let sample_count = frames
            .checked_mul(rows)
            .and_then(|v| v.checked_mul(columns))
            .and_then(|v| v.checked_mul(samples_per_pixel))
            .ok_or(DicomError::PixelLengthOverflow)?;

        let (bytes_per_sample, signed) = match kind {
            PayloadKind::Integer => {
                let bits = self.ushort(tags::BITS_ALLOCATED).ok_or(
                    DicomError::MissingPixelTag {
                        tag: tags::BITS_ALLOCATED,
                    },
                )?;
                let bytes_per_sample = match bits {
                    8 => 1,
                    16 => 2,
                    32 => 4,
                    other => return Err(DicomError::UnsupportedBitDepth { bits: other }),
                };
                let signed = self.ushort(tags::PIXEL_REPRESENTATION) == Some(1);
                (bytes_per_sample, signed)
            }
            PayloadKind::Float32 => (4, false),
            PayloadKind::Float64 => (8, false),
        };

        let expected = sample_count
            .checked_mul(bytes_per_sample)
            .ok_or(DicomError::PixelLengthOverflow)?;
        if bytes.len() < expected {
            return Err(DicomError::PixelPayloadTooShort {
                expected,
                actual: bytes.len(),
            });
        }
        // A single trailing byte of even-length padding is tolerated.
        let payload = &bytes[..expected];

        let samples = match kind {
            PayloadKind::Integer => decode_integer_samples(payload, bytes_per_sample, signed),
            PayloadKind::Float32 => PixelSamples::F32(
                payload
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            PayloadKind::Float64 => PixelSamples::F64(
                payload
                    .chunks_exact(8)
                    .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
        };

        Ok(Some(PixelBuffer {
            frames,
            rows,
            columns,
            samples_per_pixel,
            samples,
        }))
    }
}

fn decode_integer_samples(payload: &[u8], bytes_per_sample: usize, signed: bool) -> PixelSamples {
    match (bytes_per_sample, signed) {
        (1, false) => PixelSamples::U8(payload.to_vec()),
        (1, true) => PixelSamples::I8(payload.iter().map(|&b| b as i8).collect()),
        (2, false) => PixelSamples::U16(
            payload
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        ),
        (2, true) => PixelSamples::I16(
            payload
                .chunks_exact(2)
                .map(|c| i16::from_le_bytes([c[0], c[1]]))
                .collect(),
        ),
        (4, false) => PixelSamples::U32(
            payload
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        // bytes_per_sample is restricted to 1, 2 or 4 by the caller.
        _ => PixelSamples::I32(
            payload
                .chunks_exact(4)
                .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
    }
}
