//! Error types for DICOM file operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::tags::Tag;
use crate::types::Vr;

/// Errors that can occur when reading DICOM files.
#[derive(Debug, Error)]
pub enum DicomError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Not a DICOM Part 10 file (missing or damaged signature).
    #[error("not a DICOM file: {message}")]
    NotDicom { message: String },

    /// Structurally invalid DICOM stream.
    #[error("invalid DICOM file: {message}")]
    InvalidFormat { message: String },

    /// Data ran out mid-element.
    #[error("truncated DICOM stream at offset {offset}")]
    Truncated { offset: usize },

    /// Unrecognized value representation code.
    #[error("invalid VR {code:?} for element {tag}")]
    InvalidVr { tag: Tag, code: String },

    /// Element value length does not match its VR.
    #[error("invalid value length {length} for {vr} element {tag}")]
    InvalidValueLength { tag: Tag, vr: Vr, length: usize },

    /// File meta group carries no transfer syntax UID.
    #[error("file meta information has no transfer syntax UID")]
    MissingTransferSyntax,

    /// The data set encoding is not supported.
    #[error("unsupported transfer syntax: {uid}")]
    UnsupportedTransferSyntax { uid: String },

    /// Pixel stream is encapsulated in a compressed transfer syntax.
    #[error("encapsulated pixel stream not decodable: {uid}")]
    UnsupportedPixelEncoding { uid: String },

    /// Image pixel module tag required for decoding is absent.
    #[error("missing image pixel tag {tag}")]
    MissingPixelTag { tag: Tag },

    /// Stored sample size outside 8/16/32 bits.
    #[error("unsupported bits allocated: {bits}")]
    UnsupportedBitDepth { bits: u16 },

    /// Pixel payload shorter than the declared geometry requires.
    #[error("pixel payload too short: expected {expected} bytes, got {actual}")]
    PixelPayloadTooShort { expected: usize, actual: usize },

    /// Pixel geometry overflow.
    #[error("pixel buffer length overflow")]
    PixelLengthOverflow,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for DICOM operations.
pub type Result<T> = std::result::Result<T, DicomError>;

impl DicomError {
    /// Create a NotDicom error.
    pub fn not_dicom(message: impl Into<String>) -> Self {
        Self::NotDicom {
            message: message.into(),
        }
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an UnsupportedTransferSyntax error.
    pub fn unsupported_transfer_syntax(uid: impl Into<String>) -> Self {
        Self::UnsupportedTransferSyntax { uid: uid.into() }
    }

    /// Create an InvalidVr error.
    pub fn invalid_vr(tag: Tag, code: &[u8]) -> Self {
        Self::InvalidVr {
            tag,
            code: String::from_utf8_lossy(code).into_owned(),
        }
    }

    /// Create an InvalidValueLength error.
    pub fn invalid_value_length(tag: Tag, vr: Vr, length: usize) -> Self {
        Self::InvalidValueLength { tag, vr, length }
    }
}
