//
// storage.rs
// Dicom-Repair-rs
//
// Flat output directory for repaired files, named after the record's modality and instance UID.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::RepairError;
use crate::record::{trim_padding, Record};

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        // Create the output directory up front so per-file saves only fail for per-file reasons.
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create output directory {:?}", root))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, record: &Record) -> PathBuf {
        self.root.join(output_file_name(record))
    }

    /// Write the record, replacing any earlier file with the same name.
    pub fn save(&self, record: &Record) -> Result<PathBuf, RepairError> {
        let path = self.path_for(record);
        record.save(&path)?;
        Ok(path)
    }
}

/// `{modality}{instance_uid}.dcm`, e.g. `CT1.2.840.113619.2.55.3.dcm`.
pub fn output_file_name(record: &Record) -> String {
    let modality = record.modality().unwrap_or_default();
    let uid = record.instance_uid();
    format!(
        "{}{}.dcm",
        sanitize_filename(trim_padding(&modality)),
        sanitize_filename(trim_padding(&uid))
    )
}

fn sanitize_filename(input: &str) -> String {
    // Keep only ASCII word characters and UID separators so a value cannot leave the output directory.
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}
