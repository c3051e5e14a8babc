//
// repair_workflows.rs
// Dicom-Repair-rs
//
// Integration-style tests that run the repair pipeline over small DICOM folders built on the fly.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::{FileDicomObject, FileMetaTableBuilder};
use dicom::transfer_syntax::entries::EXPLICIT_VR_LITTLE_ENDIAN;
use dicom_repair::models::OutcomeKind;
use dicom_repair::status::{SilentSink, StatusSink};
use dicom_repair::{run_repairs, RepairOptions, RuleSet};
use tempfile::{tempdir, TempDir};

const MODALITY: Tag = Tag(0x0008, 0x0060);
const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
const KVP: Tag = Tag(0x0018, 0x0060);
const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);
const INSTITUTION_ADDRESS: Tag = Tag(0x0008, 0x0081);
const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);

fn write_dicom(path: &Path, instance_uid: &str, elements: &[(Tag, VR, &str)]) {
    let meta = FileMetaTableBuilder::new()
        .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN.uid())
        .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.2")
        .media_storage_sop_instance_uid(instance_uid)
        .build()
        .expect("meta");

    let mut obj = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
    obj.put(DataElement::new(
        SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(instance_uid),
    ));
    for (tag, vr, value) in elements {
        obj.put(DataElement::new(*tag, *vr, PrimitiveValue::from(*value)));
    }
    obj.write_to_file(path).expect("write test dicom");
}

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("input");
    let output = dir.path().join("output");
    fs::create_dir_all(&input).expect("input dir");
    (dir, input, output)
}

fn options(input: &Path, output: &Path, recurse: bool) -> RepairOptions {
    RepairOptions {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        recurse,
    }
}

fn read_text(path: &Path, tag: Tag) -> String {
    let obj = dicom::object::open_file(path).expect("open output");
    let value = obj
        .element(tag)
        .expect("element")
        .to_str()
        .expect("text")
        .into_owned();
    value.trim_end_matches([' ', '\0']).to_string()
}

fn output_files(output: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(output)
        .expect("list output")
        .map(|e| e.expect("entry").path())
        .collect();
    files.sort();
    files
}

#[test]
fn mixed_folder_skips_rejects_and_repairs() {
    let (_dir, input, output) = workspace();
    fs::write(input.join("a_notes.txt"), b"not a dicom file").expect("write text");
    write_dicom(
        &input.join("b_no_modality.dcm"),
        "1.2.826.0.1.3680043.2.1125.2",
        &[(KVP, VR::DS, "120")],
    );
    write_dicom(
        &input.join("c_ct.dcm"),
        "1.2.826.0.1.3680043.2.1125.3",
        &[(MODALITY, VR::CS, "MR"), (KVP, VR::DS, "120")],
    );

    let mut sink = SilentSink;
    let result = run_repairs(&options(&input, &output, true), &RuleSet::default(), &mut sink)
        .expect("run");

    let written = output_files(&output);
    assert_eq!(written, vec![output.join("CT1.2.826.0.1.3680043.2.1125.3.dcm")]);
    assert_eq!(read_text(&written[0], MODALITY), "CT");

    let skipped: Vec<_> = result
        .log
        .iter()
        .filter(|l| l.ends_with("did not contain valid DICOM data. Skipped."))
        .collect();
    assert_eq!(skipped, vec!["a_notes.txt did not contain valid DICOM data. Skipped."]);
    let rejected = result
        .log
        .iter()
        .filter(|l| *l == "Modality element not found. File not used.")
        .count();
    assert_eq!(rejected, 1);

    assert!(matches!(result.outcomes[0].kind, OutcomeKind::ParseFailed { .. }));
    assert_eq!(
        result.outcomes[1].kind,
        OutcomeKind::Rejected {
            rule: "modality-mismatch".to_string()
        }
    );
    assert!(result.outcomes[2].is_saved());

    assert_eq!(result.summary.files_analyzed, 3);
    assert!(result
        .summary
        .to_string()
        .contains("Number of files analyzed: 3"));
}

#[test]
fn mississauga_address_is_blanked_in_saved_copy() {
    let (_dir, input, output) = workspace();
    write_dicom(
        &input.join("pet.dcm"),
        "1.2.3.4.5",
        &[
            (MODALITY, VR::CS, "CT"),
            (INSTITUTION_ADDRESS, VR::ST, "123 Main St, Mississauga, ON"),
            (INSTITUTION_NAME, VR::LO, "Generic Hospital"),
            (BODY_PART_EXAMINED, VR::CS, "/\u{1b}CHEST"),
        ],
    );

    let mut sink = SilentSink;
    let result = run_repairs(&options(&input, &output, true), &RuleSet::default(), &mut sink)
        .expect("run");

    let saved = output.join("CT1.2.3.4.5.dcm");
    assert!(saved.is_file());
    assert_eq!(read_text(&saved, INSTITUTION_ADDRESS), "");
    assert_eq!(read_text(&saved, BODY_PART_EXAMINED), "");
    assert_eq!(read_text(&saved, INSTITUTION_NAME), "Generic Hospital");

    let repairs: Vec<_> = result
        .summary
        .repairs
        .iter()
        .map(|r| r.found.as_str())
        .collect();
    assert_eq!(
        repairs,
        vec![
            "Invalid Character found in element BodyPartExamined.",
            "Mismatched Institution Addresses Suspected.",
        ]
    );
}

#[test]
fn flat_scan_ignores_nested_series() {
    let (_dir, input, output) = workspace();
    let nested = input.join("Series 012");
    fs::create_dir_all(&nested).expect("nested dir");
    write_dicom(&nested.join("deep.dcm"), "1.2.3.9", &[(MODALITY, VR::CS, "CT")]);
    write_dicom(&input.join("top.dcm"), "1.2.3.8", &[(MODALITY, VR::CS, "MR")]);

    let mut sink = SilentSink;
    let flat = run_repairs(&options(&input, &output, false), &RuleSet::default(), &mut sink)
        .expect("flat run");
    assert_eq!(flat.summary.files_analyzed, 1);
    assert_eq!(output_files(&output), vec![output.join("MR1.2.3.8.dcm")]);

    let deep = run_repairs(&options(&input, &output, true), &RuleSet::default(), &mut sink)
        .expect("recursive run");
    assert_eq!(deep.summary.files_analyzed, 2);
    assert_eq!(output_files(&output).len(), 2);
}

/// Records every update and closes after a fixed number of files.
struct ClosingSink {
    close_after: usize,
    checked: usize,
    messages: Vec<(String, Option<usize>, Option<usize>)>,
}

impl StatusSink for ClosingSink {
    fn update(&mut self, message: &str, current: Option<usize>, max: Option<usize>) {
        if message.starts_with("Checking file") {
            self.checked += 1;
        }
        self.messages.push((message.to_string(), current, max));
    }

    fn is_open(&self) -> bool {
        self.checked < self.close_after
    }
}

#[test]
fn closed_sink_stops_run_between_files() {
    let (_dir, input, output) = workspace();
    for idx in 0..3 {
        write_dicom(
            &input.join(format!("img{idx}.dcm")),
            &format!("1.2.3.{idx}"),
            &[(MODALITY, VR::CS, "CT")],
        );
    }

    let mut sink = ClosingSink {
        close_after: 1,
        checked: 0,
        messages: Vec::new(),
    };
    let result = run_repairs(&options(&input, &output, true), &RuleSet::default(), &mut sink)
        .expect("run");

    assert_eq!(result.outcomes.len(), 1);
    assert_eq!(output_files(&output).len(), 1);
    assert_eq!(sink.messages[0], ("Found 3 files".to_string(), None, Some(3)));
    assert_eq!(
        sink.messages[1],
        ("Checking file img0.dcm".to_string(), Some(1), None)
    );
    let last = sink.messages.last().expect("summary");
    assert!(last.0.contains("Number of files analyzed: 1"));
}

#[test]
fn outcomes_serialize_with_kind_tag() {
    let (_dir, input, output) = workspace();
    fs::write(input.join("junk.bin"), [0_u8; 16]).expect("write junk");

    let mut sink = SilentSink;
    let result = run_repairs(&options(&input, &output, true), &RuleSet::default(), &mut sink)
        .expect("run");

    let value = serde_json::to_value(&result.outcomes).expect("json");
    assert_eq!(value[0]["kind"], "parse_failed");
    assert!(value[0]["path"].as_str().expect("path").ends_with("junk.bin"));
    assert!(output_files(&output).is_empty());
}

#[test]
fn write_failure_is_reported_and_run_continues() {
    let (_dir, input, output) = workspace();
    write_dicom(&input.join("a.dcm"), "1.2.3", &[(MODALITY, VR::CS, "CT")]);
    write_dicom(&input.join("b.dcm"), "1.2.4", &[(MODALITY, VR::CS, "CT")]);
    // A directory squatting on the first output name makes that save fail.
    fs::create_dir_all(output.join("CT1.2.3.dcm")).expect("blocking dir");

    let mut sink = SilentSink;
    let result = run_repairs(&options(&input, &output, true), &RuleSet::default(), &mut sink)
        .expect("run");

    assert_eq!(result.outcomes.len(), 2);
    assert!(matches!(
        result.outcomes[0].kind,
        OutcomeKind::WriteFailed { .. }
    ));
    assert_eq!(
        result.outcomes[1].kind,
        OutcomeKind::Saved {
            output: output.join("CT1.2.4.dcm")
        }
    );
    assert!(result
        .log
        .iter()
        .any(|l| l.starts_with("a.dcm could not be saved. ")));
    assert!(output.join("CT1.2.4.dcm").is_file());
    assert!(output.join("CT1.2.3.dcm").is_dir());
}
