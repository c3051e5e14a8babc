//
// rules.rs
// Dicom-Repair-rs
//
// The ordered set of repair rules that fix metadata known to block import into the planning system.
//
// Thales Matheus Mendonça Santos - November 2025

use dicom::core::Tag;
use tracing::debug;

use crate::record::{field_name, Record, MODALITY};
use crate::status::LogSink;

pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
pub const OTHER_PATIENT_IDS: Tag = Tag(0x0010, 0x1000);
pub const KVP: Tag = Tag(0x0018, 0x0060);
pub const RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE: Tag = Tag(0x0054, 0x0016);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
pub const INSTITUTION_ADDRESS: Tag = Tag(0x0008, 0x0081);

/// Verdict of a single rule on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// The record is unusable; later rules and the save step are skipped.
    Reject,
}

/// Which rule discarded a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub rule: &'static str,
}

pub trait RepairRule {
    fn name(&self) -> &'static str;

    fn apply(&self, record: &mut Record, log: &mut dyn LogSink) -> Verdict;
}

/// Blank text fields whose value starts with `/`, the start of a non-printable escape sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvalidCharacterRule;

impl RepairRule for InvalidCharacterRule {
    fn name(&self) -> &'static str {
        "invalid-character"
    }

    fn apply(&self, record: &mut Record, log: &mut dyn LogSink) -> Verdict {
        for tag in [BODY_PART_EXAMINED, OTHER_PATIENT_IDS] {
            // Absent and non-textual values are never considered invalid.
            let invalid = record
                .field(tag)
                .as_text()
                .is_some_and(|value| value.starts_with('/'));
            if invalid {
                log.log(format!(
                    "Invalid Character found in element {}.\tReplaced with blank string.",
                    field_name(tag)
                ));
                record.set_text(tag, "");
            }
        }
        Verdict::Keep
    }
}

/// Make the Modality agree with the CT or PET surrogate elements present in the dataset.
///
/// CT images carry KVP (0018,0060); PET images carry the Radiopharmaceutical
/// Information Sequence (0054,0016). Both checks run against the modality as
/// read, so a record carrying both surrogates ends up as `PT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModalityMismatchRule;

impl RepairRule for ModalityMismatchRule {
    fn name(&self) -> &'static str {
        "modality-mismatch"
    }

    fn apply(&self, record: &mut Record, log: &mut dyn LogSink) -> Verdict {
        let field = record.field(MODALITY);
        if !field.is_present() {
            log.log("Modality element not found. File not used.".to_string());
            return Verdict::Reject;
        }
        let modality = field.as_text().unwrap_or_default().to_string();

        let corrections = [
            (KVP, "CT"),
            (RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE, "PT"),
        ];
        for (surrogate, expected) in corrections {
            if record.has(surrogate) && !modality.contains(expected) {
                log.log(format!(
                    "Incorrect Modality found.\tModality changed from \"{modality}\" to \"{expected}\""
                ));
                record.set_text(MODALITY, expected);
            }
        }
        Verdict::Keep
    }
}

/// Blank institution addresses suspected to differ between series of one study.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstitutionAddressRule;

impl InstitutionAddressRule {
    const SUSPECT_ADDRESSES: [&'static str; 2] = ["Mississauga", "Stuart 76,Kingston"];
    const SUSPECT_INSTITUTION: &'static str = "University Health Network";
    const PREVIEW_START: usize = 25;
}

impl RepairRule for InstitutionAddressRule {
    fn name(&self) -> &'static str {
        "institution-address"
    }

    fn apply(&self, record: &mut Record, log: &mut dyn LogSink) -> Verdict {
        let Some(address) = record.text(INSTITUTION_ADDRESS) else {
            return Verdict::Keep;
        };
        let institution = record.text(INSTITUTION_NAME).unwrap_or_default();

        let suspect = Self::SUSPECT_ADDRESSES
            .iter()
            .any(|needle| address.contains(needle))
            || institution.contains(Self::SUSPECT_INSTITUTION);
        if suspect {
            log.log(format!(
                "Mismatched Institution Addresses Suspected.\tAddress: \"{}\" Replaced with blank string.",
                address_preview(&address, Self::PREVIEW_START)
            ));
            record.set_text(INSTITUTION_ADDRESS, "");
        }
        Verdict::Keep
    }
}

/// Address cut before the first space at or after character `start`; the whole address when there is none.
pub fn address_preview(address: &str, start: usize) -> &str {
    address
        .char_indices()
        .skip(start)
        .find(|&(_, c)| c == ' ')
        .map_or(address, |(offset, _)| &address[..offset])
}

/// The active rules, in the order they must run.
pub struct RuleSet {
    rules: Vec<Box<dyn RepairRule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(vec![
            Box::new(InvalidCharacterRule),
            Box::new(ModalityMismatchRule),
            Box::new(InstitutionAddressRule),
        ])
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn RepairRule>>) -> Self {
        Self { rules }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule in order, stopping at the first rejection.
    pub fn apply(&self, record: &mut Record, log: &mut dyn LogSink) -> Result<(), Rejection> {
        for rule in &self.rules {
            if rule.apply(record, log) == Verdict::Reject {
                debug!(rule = rule.name(), "record rejected");
                return Err(Rejection { rule: rule.name() });
            }
        }
        Ok(())
    }
}
