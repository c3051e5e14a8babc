//
// record.rs
// Dicom-Repair-rs
//
// Wraps a parsed DICOM file with an explicit optional-field accessor used by the repair rules.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::Path;

use dicom::core::dictionary::DataDictionary;
use dicom::core::value::Value;
use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::mem::InMemElement;
use dicom::object::{open_file, DefaultDicomObject};

use crate::error::RepairError;

pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);

/// Value held by a present field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Textual value; multi-valued text is joined with `\`.
    Text(String),
    /// Numbers, binary data and sequences.
    NonText,
}

/// Result of looking a field up in a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Present(FieldValue),
    Absent,
}

impl Field {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Text content, or `None` when the field is absent or not textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Present(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// One parsed DICOM file, owned by the pipeline while it is being repaired.
#[derive(Debug)]
pub struct Record {
    obj: DefaultDicomObject,
}

impl Record {
    pub fn open(path: &Path) -> Result<Self, RepairError> {
        let obj = open_file(path).map_err(|source| RepairError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { obj })
    }

    pub fn from_object(obj: DefaultDicomObject) -> Self {
        Self { obj }
    }

    pub fn into_inner(self) -> DefaultDicomObject {
        self.obj
    }

    pub fn field(&self, tag: Tag) -> Field {
        match self.obj.element(tag) {
            Ok(elem) => Field::Present(classify(elem)),
            Err(_) => Field::Absent,
        }
    }

    pub fn has(&self, tag: Tag) -> bool {
        self.field(tag).is_present()
    }

    pub fn text(&self, tag: Tag) -> Option<String> {
        self.field(tag).as_text().map(str::to_string)
    }

    /// Replace a field with a text value, keeping its VR when it already exists.
    pub fn set_text(&mut self, tag: Tag, value: &str) {
        let vr = self
            .obj
            .element(tag)
            .map(|e| e.header().vr)
            .unwrap_or_else(|_| default_text_vr(tag));
        self.obj
            .put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
    }

    pub fn modality(&self) -> Option<String> {
        self.text(MODALITY)
    }

    /// SOP Instance UID from the dataset, falling back to the file meta group.
    pub fn instance_uid(&self) -> String {
        self.text(SOP_INSTANCE_UID)
            .filter(|uid| !uid.is_empty())
            .unwrap_or_else(|| {
                trim_padding(&self.obj.meta().media_storage_sop_instance_uid).to_string()
            })
    }

    pub fn save(&self, path: &Path) -> Result<(), RepairError> {
        self.obj
            .write_to_file(path)
            .map_err(|source| RepairError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Dictionary alias for a tag, e.g. `BodyPartExamined`.
pub fn field_name(tag: Tag) -> String {
    StandardDataDictionary::default()
        .by_tag(tag)
        .map(|e| e.alias.to_string())
        .unwrap_or_else(|| format!("({:04X},{:04X})", tag.group(), tag.element()))
}

fn classify(elem: &InMemElement) -> FieldValue {
    let vr = elem.header().vr;
    match elem.value() {
        Value::Primitive(p) => match p {
            PrimitiveValue::Str(_)
            | PrimitiveValue::Strs(_)
            | PrimitiveValue::Date(_)
            | PrimitiveValue::Time(_)
            | PrimitiveValue::DateTime(_) => {
                FieldValue::Text(trim_padding(&p.to_str()).to_string())
            }
            PrimitiveValue::Empty if is_text_vr(vr) => FieldValue::Text(String::new()),
            _ => FieldValue::NonText,
        },
        Value::Sequence(_) | Value::PixelSequence(_) => FieldValue::NonText,
    }
}

fn is_text_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UC
            | VR::UI
            | VR::UR
            | VR::UT
    )
}

fn default_text_vr(tag: Tag) -> VR {
    if tag == MODALITY {
        VR::CS
    } else {
        VR::LO
    }
}

/// DICOM pads odd-length values with a trailing space or NUL.
pub fn trim_padding(value: &str) -> &str {
    value.trim_end_matches(|c| c == ' ' || c == '\0')
}
