//! DICOM Part 10 file format reader.
//!
//! This crate parses DICOM files far enough to classify them, project header
//! fields and decode uncompressed pixel payloads.
//!
//! # Features
//!
//! - Part 10 structural validation (preamble, `DICM` marker, file meta group)
//! - Implicit and explicit VR little endian data sets
//! - Undefined-length sequence traversal via the delimiter protocol
//! - Typed element values with optional lookup by tag
//! - Pixel buffer decoding for 8/16/32-bit integer and 32/64-bit float
//!   payloads of arbitrary frame and channel counts
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use dscan_dicom::{is_dicom_file, read_file, tags};
//!
//! let path = Path::new("image.dcm");
//! if is_dicom_file(path) {
//!     let object = read_file(path).unwrap();
//!     println!("modality: {:?}", object.display_string(tags::MODALITY));
//!     if let Ok(Some(buffer)) = object.pixel_buffer() {
//!         println!("{} samples", buffer.sample_count());
//!     }
//! }
//! ```

mod error;
mod pixels;
mod reader;
pub mod tags;
mod types;

// Re-export error types
pub use error::{DicomError, Result};

// Re-export the tag type (named constants stay under `tags`)
pub use tags::Tag;

// Re-export core types
pub use types::{DataElement, DicomObject, ElementValue, FileMeta, TransferSyntax, Vr};

// Re-export reader functionality
pub use reader::{
    DicomReader, DicomReaderOptions, is_dicom_file, read_file, read_file_with_options, read_header,
};

// Re-export pixel decoding
pub use pixels::{PixelBuffer, PixelSamples};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
