//
// models.rs
// Dicom-Repair-rs
//
// Serializable per-file outcomes and the run report written alongside the repaired files.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::summary::RunSummary;

/// What happened to one discovered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeKind {
    Saved { output: PathBuf },
    ParseFailed { reason: String },
    Rejected { rule: String },
    WriteFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: OutcomeKind,
}

impl FileOutcome {
    pub fn new(path: PathBuf, kind: OutcomeKind) -> Self {
        Self { path, kind }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self.kind, OutcomeKind::Saved { .. })
    }
}

/// Everything a caller needs to audit a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: String,
    pub finished_at: String,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub recurse: bool,
    pub files: Vec<FileOutcome>,
    pub summary: RunSummary,
}
