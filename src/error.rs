//
// error.rs
// Dicom-Repair-rs
//
// Per-file failure kinds raised while reading or saving a DICOM record.
//
// Thales Matheus Mendonça Santos - November 2025

use std::path::PathBuf;

use thiserror::Error;

/// Failures that affect a single file. None of them stop a repair run.
#[derive(Debug, Error)]
pub enum RepairError {
    #[error("failed to read DICOM data from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: dicom::object::ReadError,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: dicom::object::WriteError,
    },
}
