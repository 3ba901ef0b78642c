//! Core types for parsed DICOM objects.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DicomError, Result};
use crate::tags::Tag;

/// Value representation of a data element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vr {
    Ae,
    As,
    At,
    Cs,
    Da,
    Ds,
    Dt,
    Fd,
    Fl,
    Is,
    Lo,
    Lt,
    Ob,
    Od,
    Of,
    Ol,
    Ow,
    Pn,
    Sh,
    Sl,
    Sq,
    Ss,
    St,
    Tm,
    Uc,
    Ui,
    Ul,
    Un,
    Ur,
    Us,
    Ut,
}

impl Vr {
    /// Parse a two-byte VR code from an explicit VR stream.
    pub fn from_bytes(code: [u8; 2]) -> Option<Self> {
        match &code {
            b"AE" => Some(Self::Ae),
            b"AS" => Some(Self::As),
            b"AT" => Some(Self::At),
            b"CS" => Some(Self::Cs),
            b"DA" => Some(Self::Da),
            b"DS" => Some(Self::Ds),
            b"DT" => Some(Self::Dt),
            b"FD" => Some(Self::Fd),
            b"FL" => Some(Self::Fl),
            b"IS" => Some(Self::Is),
            b"LO" => Some(Self::Lo),
            b"LT" => Some(Self::Lt),
            b"OB" => Some(Self::Ob),
            b"OD" => Some(Self::Od),
            b"OF" => Some(Self::Of),
            b"OL" => Some(Self::Ol),
            b"OW" => Some(Self::Ow),
            b"PN" => Some(Self::Pn),
            b"SH" => Some(Self::Sh),
            b"SL" => Some(Self::Sl),
            b"SQ" => Some(Self::Sq),
            b"SS" => Some(Self::Ss),
            b"ST" => Some(Self::St),
            b"TM" => Some(Self::Tm),
            b"UC" => Some(Self::Uc),
            b"UI" => Some(Self::Ui),
            b"UL" => Some(Self::Ul),
            b"UN" => Some(Self::Un),
            b"UR" => Some(Self::Ur),
            b"US" => Some(Self::Us),
            b"UT" => Some(Self::Ut),
            _ => None,
        }
    }

    /// Two-letter code as written in the stream.
    pub fn code(self) -> &'static str {
        match self {
            Self::Ae => "AE",
            Self::As => "AS",
            Self::At => "AT",
            Self::Cs => "CS",
            Self::Da => "DA",
            Self::Ds => "DS",
            Self::Dt => "DT",
            Self::Fd => "FD",
            Self::Fl => "FL",
            Self::Is => "IS",
            Self::Lo => "LO",
            Self::Lt => "LT",
            Self::Ob => "OB",
            Self::Od => "OD",
            Self::Of => "OF",
            Self::Ol => "OL",
            Self::Ow => "OW",
            Self::Pn => "PN",
            Self::Sh => "SH",
            Self::Sl => "SL",
            Self::Sq => "SQ",
            Self::Ss => "SS",
            Self::St => "ST",
            Self::Tm => "TM",
            Self::Uc => "UC",
            Self::Ui => "UI",
            Self::Ul => "UL",
            Self::Un => "UN",
            Self::Ur => "UR",
            Self::Us => "US",
            Self::Ut => "UT",
        }
    }

    /// True for VRs written with the 12-byte long-form header in explicit VR
    /// streams (2 reserved bytes followed by a 4-byte length).
    pub fn long_form(self) -> bool {
        matches!(
            self,
            Self::Ob
                | Self::Od
                | Self::Of
                | Self::Ol
                | Self::Ow
                | Self::Sq
                | Self::Uc
                | Self::Un
                | Self::Ur
                | Self::Ut
        )
    }

    /// True for VRs whose value is character data.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::Ae
                | Self::As
                | Self::Cs
                | Self::Da
                | Self::Ds
                | Self::Dt
                | Self::Is
                | Self::Lo
                | Self::Lt
                | Self::Pn
                | Self::Sh
                | Self::St
                | Self::Tm
                | Self::Uc
                | Self::Ui
                | Self::Ur
                | Self::Ut
        )
    }
}

impl fmt::Display for Vr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Data set encoding negotiated through the file meta information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSyntax {
    /// 1.2.840.10008.1.2 — implicit VR, little endian.
    ImplicitVrLittleEndian,
    /// 1.2.840.10008.1.2.1 — explicit VR, little endian.
    ExplicitVrLittleEndian,
    /// Any encapsulated (compressed) syntax. The data set itself is explicit
    /// VR little endian; the pixel stream is fragmented and not decodable
    /// here.
    Encapsulated { uid: String },
}

const IMPLICIT_VR_LE: &str = "1.2.840.10008.1.2";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
const EXPLICIT_VR_BE: &str = "1.2.840.10008.1.2.2";
const DEFLATED_EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1.99";

impl TransferSyntax {
    /// Resolve a transfer syntax UID into a supported data set encoding.
    pub fn from_uid(uid: &str) -> Result<Self> {
        match uid {
            IMPLICIT_VR_LE => Ok(Self::ImplicitVrLittleEndian),
            EXPLICIT_VR_LE => Ok(Self::ExplicitVrLittleEndian),
            EXPLICIT_VR_BE | DEFLATED_EXPLICIT_VR_LE => {
                Err(DicomError::unsupported_transfer_syntax(uid))
            }
            other if other.starts_with("1.2.840.10008.1.2.") => Ok(Self::Encapsulated {
                uid: other.to_string(),
            }),
            other => Err(DicomError::unsupported_transfer_syntax(other)),
        }
    }

    /// True when element headers carry an explicit VR code.
    pub fn explicit_vr(&self) -> bool {
        !matches!(self, Self::ImplicitVrLittleEndian)
    }

    /// The UID this syntax was resolved from.
    pub fn uid(&self) -> &str {
        match self {
            Self::ImplicitVrLittleEndian => IMPLICIT_VR_LE,
            Self::ExplicitVrLittleEndian => EXPLICIT_VR_LE,
            Self::Encapsulated { uid } => uid,
        }
    }
}

/// Decoded value of a data element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// Character data, trailing padding removed. Multiple values keep their
    /// backslash separators.
    Text(String),
    /// US / UL values.
    Unsigned(Vec<u64>),
    /// SS / SL values.
    Signed(Vec<i64>),
    /// FL / FD values.
    Float(Vec<f64>),
    /// AT values.
    Tags(Vec<Tag>),
    /// Raw binary payload (OB, OW, OF, OD, OL, UN).
    Bytes(Vec<u8>),
    /// Sequence of items; contents are traversed but not retained.
    Sequence,
    /// Undefined-length binary stream (compressed pixel fragments).
    Encapsulated,
    /// Present with zero-length value.
    Empty,
}

/// One parsed data element.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    pub tag: Tag,
    pub vr: Vr,
    pub value: ElementValue,
}

impl DataElement {
    /// Render the value as display text, if the VR is displayable.
    ///
    /// Binary payloads, sequences and encapsulated streams have no text
    /// rendering and return `None`.
    pub fn display_string(&self) -> Option<String> {
        match &self.value {
            ElementValue::Text(text) => Some(text.trim().to_string()),
            ElementValue::Unsigned(values) => Some(join_values(values)),
            ElementValue::Signed(values) => Some(join_values(values)),
            ElementValue::Float(values) => Some(join_values(values)),
            ElementValue::Tags(tags) => Some(join_values(tags)),
            ElementValue::Empty => Some(String::new()),
            ElementValue::Bytes(_) | ElementValue::Sequence | ElementValue::Encapsulated => None,
        }
    }
}

fn join_values<T: fmt::Display>(values: &[T]) -> String {
    let mut out = String::new();
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            out.push('\\');
        }
        out.push_str(&value.to_string());
    }
    out
}

/// File meta information (group 0002) of a Part 10 file.
#[derive(Debug, Clone, Default)]
pub struct FileMeta {
    /// Transfer syntax UID governing the data set encoding.
    pub transfer_syntax_uid: String,
    /// SOP class of the stored object, when present.
    pub media_storage_sop_class_uid: Option<String>,
    /// SOP instance of the stored object, when present.
    pub media_storage_sop_instance_uid: Option<String>,
}

/// A parsed DICOM object: file meta plus the data set elements in canonical
/// tag order.
#[derive(Debug, Clone)]
pub struct DicomObject {
    meta: FileMeta,
    transfer_syntax: TransferSyntax,
    elements: BTreeMap<Tag, DataElement>,
}

impl DicomObject {
    pub(crate) fn new(
        meta: FileMeta,
        transfer_syntax: TransferSyntax,
        elements: BTreeMap<Tag, DataElement>,
    ) -> Self {
        Self {
            meta,
            transfer_syntax,
            elements,
        }
    }

    /// Build an object from elements held in memory.
    ///
    /// Mainly useful for synthetic objects in tests; parsed objects come from
    /// the reader.
    pub fn from_elements(
        meta: FileMeta,
        transfer_syntax: TransferSyntax,
        elements: impl IntoIterator<Item = DataElement>,
    ) -> Self {
        let elements = elements.into_iter().map(|e| (e.tag, e)).collect();
        Self::new(meta, transfer_syntax, elements)
    }

    /// File meta information.
    pub fn meta(&self) -> &FileMeta {
        &self.meta
    }

    /// Data set encoding of the file.
    pub fn transfer_syntax(&self) -> &TransferSyntax {
        &self.transfer_syntax
    }

    /// Typed optional lookup of a data element.
    pub fn get(&self, tag: Tag) -> Option<&DataElement> {
        self.elements.get(&tag)
    }

    /// Whether the data set carries the given tag.
    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Display text for an element, `None` when the tag is absent or the
    /// value has no text rendering.
    pub fn display_string(&self, tag: Tag) -> Option<String> {
        self.get(tag).and_then(DataElement::display_string)
    }

    /// First US value of an element, if present and unsigned.
    pub fn ushort(&self, tag: Tag) -> Option<u16> {
        match self.get(tag)?.value {
            ElementValue::Unsigned(ref values) => {
                values.first().copied().and_then(|v| u16::try_from(v).ok())
            }
            _ => None,
        }
    }

    /// Text value of an element, if present and textual.
    pub fn text(&self, tag: Tag) -> Option<&str> {
        match self.get(tag)?.value {
            ElementValue::Text(ref text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Number of data set elements (file meta excluded).
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Iterate elements in canonical tag order.
    pub fn iter(&self) -> impl Iterator<Item = &DataElement> {
        self.elements.values()
    }
}
