//! DICOM file reader.
//!
//! Parses DICOM Part 10 files: preamble, `DICM` marker, file meta group and
//! the data set in the negotiated transfer syntax.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{DicomError, Result};
use crate::tags::{self, Tag};
use crate::types::{DataElement, DicomObject, ElementValue, FileMeta, TransferSyntax, Vr};

/// Length of the Part 10 preamble.
const PREAMBLE_LEN: usize = 128;

/// Marker following the preamble.
const MAGIC: &[u8; 4] = b"DICM";

/// Element or item length meaning "delimited, not counted".
const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

/// Options controlling how much of a file is parsed.
#[derive(Debug, Clone)]
pub struct DicomReaderOptions {
    /// Parse pixel payload elements (group 7FE0). Disabled for the
    /// header-only structural check.
    pub read_pixel_data: bool,
}

impl Default for DicomReaderOptions {
    fn default() -> Self {
        Self {
            read_pixel_data: true,
        }
    }
}

/// DICOM file reader.
///
/// Reads implicit and explicit VR little endian data sets; encapsulated
/// transfer syntaxes parse structurally with the pixel stream left undecoded.
pub struct DicomReader<R: Read> {
    reader: BufReader<R>,
    options: DicomReaderOptions,
}

impl<R: Read> DicomReader<R> {
    /// Create a new reader with default options.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: DicomReaderOptions::default(),
        }
    }

    /// Create a new reader with options.
    pub fn with_options(reader: R, options: DicomReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the entire stream into memory and parse it.
    pub fn read_object(mut self) -> Result<DicomObject> {
        let data = self.read_all_bytes()?;
        parse_dicom_data(&data, &self.options)
    }

    fn read_all_bytes(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

impl DicomReader<File> {
    /// Open a DICOM file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(open_file(path)?))
    }

    /// Open a DICOM file with options.
    pub fn open_with_options(path: &Path, options: DicomReaderOptions) -> Result<Self> {
        Ok(Self::with_options(open_file(path)?, options))
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DicomError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DicomError::Io(e)
        }
    })
}

/// Read and fully parse a DICOM file, pixel payload included.
pub fn read_file(path: &Path) -> Result<DicomObject> {
    DicomReader::open(path)?.read_object()
}

/// Read a DICOM file with options.
pub fn read_file_with_options(path: &Path, options: DicomReaderOptions) -> Result<DicomObject> {
    DicomReader::open_with_options(path, options)?.read_object()
}

/// Structurally parse a DICOM file header, stopping before any pixel payload.
pub fn read_header(path: &Path) -> Result<DicomObject> {
    read_file_with_options(
        path,
        DicomReaderOptions {
            read_pixel_data: false,
        },
    )
}

/// Whether a file is a well-formed DICOM record.
///
/// This is the classification filter: any failure (signature mismatch,
/// truncated or corrupt header, unsupported data set encoding, permission or
/// other I/O error) reports `false` rather than raising.
pub fn is_dicom_file(path: &Path) -> bool {
    read_header(path).is_ok()
}

/// Parse DICOM data from bytes.
fn parse_dicom_data(data: &[u8], options: &DicomReaderOptions) -> Result<DicomObject> {
    if data.len() < PREAMBLE_LEN + MAGIC.len() {
        return Err(DicomError::not_dicom("file too small for preamble"));
    }
    if &data[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] != MAGIC {
        return Err(DicomError::not_dicom("missing DICM marker"));
    }

    let (meta, offset) = parse_file_meta(data, PREAMBLE_LEN + MAGIC.len())?;
    let syntax = TransferSyntax::from_uid(&meta.transfer_syntax_uid)?;
    let elements = parse_data_set(data, offset, &syntax, options)?;

    Ok(DicomObject::new(meta, syntax, elements))
}

/// Parse the file meta group (0002), which is always explicit VR little
/// endian regardless of the data set encoding.
fn parse_file_meta(data: &[u8], mut offset: usize) -> Result<(FileMeta, usize)> {
    let mut meta = FileMeta::default();
    let mut end_of_meta: Option<usize> = None;
    let mut seen_any = false;

    loop {
        match end_of_meta {
            Some(end) => {
                if offset >= end {
                    break;
                }
            }
            None => {
                // Without a group length, the group boundary is detected by
                // peeking at the next tag.
                if offset + 4 > data.len() {
                    break;
                }
                if read_u16_le(data, offset)? != 0x0002 {
                    break;
                }
            }
        }

        let (element, next) = parse_element(data, offset, &TransferSyntax::ExplicitVrLittleEndian)?;
        if element.tag.group != 0x0002 {
            return Err(DicomError::invalid_format(format!(
                "unexpected element {} inside file meta group",
                element.tag
            )));
        }

        if element.tag == tags::FILE_META_GROUP_LENGTH {
            if let ElementValue::Unsigned(ref values) = element.value
                && let Some(group_len) = values.first()
            {
                end_of_meta = Some(next.saturating_add(*group_len as usize));
            }
        } else if element.tag == tags::TRANSFER_SYNTAX_UID {
            meta.transfer_syntax_uid = element.display_string().unwrap_or_default();
        } else if element.tag == tags::MEDIA_STORAGE_SOP_CLASS_UID {
            meta.media_storage_sop_class_uid = element.display_string();
        } else if element.tag == tags::MEDIA_STORAGE_SOP_INSTANCE_UID {
            meta.media_storage_sop_instance_uid = element.display_string();
        }

        seen_any = true;
        offset = next;
    }

    if !seen_any {
        return Err(DicomError::invalid_format("missing file meta group"));
    }
    if meta.transfer_syntax_uid.is_empty() {
        return Err(DicomError::MissingTransferSyntax);
    }
    Ok((meta, offset))
}

/// Parse data set elements until the end of the stream.
fn parse_data_set(
    data: &[u8],
    mut offset: usize,
    syntax: &TransferSyntax,
    options: &DicomReaderOptions,
) -> Result<BTreeMap<Tag, DataElement>> {
    let mut elements = BTreeMap::new();

    while offset < data.len() {
        if data.len() - offset < 8 {
            // Writers may pad the stream to an even boundary.
            if data[offset..].iter().all(|&b| b == 0) {
                break;
            }
            return Err(DicomError::Truncated { offset });
        }

        let (tag, _) = read_tag(data, offset)?;
        if tag.group == 0x7FE0 && !options.read_pixel_data {
            break;
        }

        let (element, next) = parse_element(data, offset, syntax)?;
        elements.insert(element.tag, element);
        offset = next;
    }

    Ok(elements)
}

/// Parse a single data element, returning it together with the offset of the
/// next element.
fn parse_element(
    data: &[u8],
    offset: usize,
    syntax: &TransferSyntax,
) -> Result<(DataElement, usize)> {
    let (tag, after_tag) = read_tag(data, offset)?;
    if tag.is_delimitation() {
        return Err(DicomError::invalid_format(format!(
            "delimitation tag {tag} outside a sequence"
        )));
    }

    let (vr, length, value_offset) = if syntax.explicit_vr() {
        let block = read_block(data, after_tag, 2)?;
        let code = [block[0], block[1]];
        let vr = Vr::from_bytes(code).ok_or_else(|| DicomError::invalid_vr(tag, &code))?;
        if vr.long_form() {
            let length = read_u32_le(data, after_tag + 4)?;
            (vr, length, after_tag + 8)
        } else {
            let length = u32::from(read_u16_le(data, after_tag + 2)?);
            (vr, length, after_tag + 4)
        }
    } else {
        let length = read_u32_le(data, after_tag)?;
        (tags::implicit_vr(tag), length, after_tag + 4)
    };

    if length == UNDEFINED_LEN {
        let value = match vr {
            Vr::Sq | Vr::Un => ElementValue::Sequence,
            Vr::Ob | Vr::Ow if tag == tags::PIXEL_DATA => ElementValue::Encapsulated,
            _ => {
                return Err(DicomError::invalid_format(format!(
                    "undefined length on {vr} element {tag}"
                )));
            }
        };
        let end = skip_sequence(data, value_offset, syntax)?;
        return Ok((DataElement { tag, vr, value }, end));
    }

    let length = length as usize;
    let bytes = read_block(data, value_offset, length)?;
    let value = decode_value(tag, vr, bytes)?;
    Ok((DataElement { tag, vr, value }, value_offset + length))
}

/// Walk the items of an undefined-length value up to its sequence delimiter.
fn skip_sequence(data: &[u8], mut offset: usize, syntax: &TransferSyntax) -> Result<usize> {
    loop {
        let (tag, after_tag) = read_tag(data, offset)?;
        let length = read_u32_le(data, after_tag)?;
        let cursor = after_tag + 4;

        if tag == tags::SEQUENCE_DELIMITER {
            return Ok(cursor);
        }
        if tag != tags::ITEM {
            return Err(DicomError::invalid_format(format!(
                "expected item tag in sequence, found {tag}"
            )));
        }

        if length == UNDEFINED_LEN {
            offset = skip_item(data, cursor, syntax)?;
        } else {
            let length = length as usize;
            read_block(data, cursor, length)?;
            offset = cursor + length;
        }
    }
}

/// Walk the elements of an undefined-length item up to its delimiter.
fn skip_item(data: &[u8], mut offset: usize, syntax: &TransferSyntax) -> Result<usize> {
    loop {
        let (tag, after_tag) = read_tag(data, offset)?;
        if tag == tags::ITEM_DELIMITER {
            read_u32_le(data, after_tag)?;
            return Ok(after_tag + 4);
        }
        let (_element, next) = parse_element(data, offset, syntax)?;
        offset = next;
    }
}

/// Decode an element value according to its VR.
fn decode_value(tag: Tag, vr: Vr, bytes: &[u8]) -> Result<ElementValue> {
    if bytes.is_empty() {
        return Ok(ElementValue::Empty);
    }
    let value = match vr {
        Vr::Sq => ElementValue::Sequence,
        v if v.is_text() => ElementValue::Text(decode_text(bytes)),
        Vr::Us => ElementValue::Unsigned(decode_scalars(tag, vr, bytes, 2, |c| {
            u64::from(u16::from_le_bytes([c[0], c[1]]))
        })?),
        Vr::Ul => ElementValue::Unsigned(decode_scalars(tag, vr, bytes, 4, |c| {
            u64::from(u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        })?),
        Vr::Ss => ElementValue::Signed(decode_scalars(tag, vr, bytes, 2, |c| {
            i64::from(i16::from_le_bytes([c[0], c[1]]))
        })?),
        Vr::Sl => ElementValue::Signed(decode_scalars(tag, vr, bytes, 4, |c| {
            i64::from(i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        })?),
        Vr::Fl => ElementValue::Float(decode_scalars(tag, vr, bytes, 4, |c| {
            f64::from(f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        })?),
        Vr::Fd => ElementValue::Float(decode_scalars(tag, vr, bytes, 8, |c| {
            f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])
        })?),
        Vr::At => ElementValue::Tags(decode_scalars(tag, vr, bytes, 4, |c| {
            Tag::new(
                u16::from_le_bytes([c[0], c[1]]),
                u16::from_le_bytes([c[2], c[3]]),
            )
        })?),
        Vr::Ob | Vr::Od | Vr::Of | Vr::Ol | Vr::Ow | Vr::Un => {
            ElementValue::Bytes(bytes.to_vec())
        }
        // Text VRs are matched by the is_text guard above.
        _ => unreachable!("VR {vr} not covered"),
    };
    Ok(value)
}

/// Split a value into fixed-size scalars.
fn decode_scalars<T>(
    tag: Tag,
    vr: Vr,
    bytes: &[u8],
    size: usize,
    decode: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>> {
    if !bytes.len().is_multiple_of(size) {
        return Err(DicomError::invalid_value_length(tag, vr, bytes.len()));
    }
    Ok(bytes.chunks_exact(size).map(decode).collect())
}

/// Decode character data, removing trailing padding.
fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.trim_end_matches(['\0', ' ']).to_string()
}

fn read_tag(data: &[u8], offset: usize) -> Result<(Tag, usize)> {
    let group = read_u16_le(data, offset)?;
    let element = read_u16_le(data, offset + 2)?;
    Ok((Tag::new(group, element), offset + 4))
}

fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    let block = read_block(data, offset, 2)?;
    Ok(u16::from_le_bytes([block[0], block[1]]))
}

fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    let block = read_block(data, offset, 4)?;
    Ok(u32::from_le_bytes([block[0], block[1], block[2], block[3]]))
}

/// Read a block of bytes.
fn read_block(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(DicomError::Truncated { offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"CT "), "CT");
        assert_eq!(decode_text(b"1.2.840.10008.1.2.1\0"), "1.2.840.10008.1.2.1");
        assert_eq!(decode_text(b"Doe^Jane"), "Doe^Jane");
    }

    #[test]
    fn test_decode_unsigned_shorts() {
        let value = decode_value(tags::ROWS, Vr::Us, &[0x00, 0x02, 0x10, 0x00]).unwrap();
        assert_eq!(value, ElementValue::Unsigned(vec![512, 16]));
    }

    #[test]
    fn test_decode_double() {
        let bytes = 1.5f64.to_le_bytes();
        let value = decode_value(tags::DOUBLE_FLOAT_PIXEL_DATA, Vr::Fd, &bytes).unwrap();
        assert_eq!(value, ElementValue::Float(vec![1.5]));
    }

    #[test]
    fn test_decode_odd_length_is_error() {
        let result = decode_value(tags::ROWS, Vr::Us, &[0x00, 0x02, 0x10]);
        assert!(matches!(
            result,
            Err(DicomError::InvalidValueLength { length: 3, .. })
        ));
    }

    #[test]
    fn test_decode_empty_value() {
        let value = decode_value(tags::PATIENT_ID, Vr::Lo, &[]).unwrap();
        assert_eq!(value, ElementValue::Empty);
    }

    #[test]
    fn test_read_block_bounds() {
        let data = [0u8; 4];
        assert!(read_block(&data, 0, 4).is_ok());
        assert!(matches!(
            read_block(&data, 2, 4),
            Err(DicomError::Truncated { offset: 2 })
        ));
    }
}
