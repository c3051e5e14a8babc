//
// lib.rs
// Dicom-Repair-rs
//
// Exposes the crate's modules and re-exports the pipeline entry points for both binary and library consumers.
//
// Thales Matheus Mendonça Santos - November 2025

// Public surface of the library: the pipeline, its rules and the pieces it is built from.
pub mod cli;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod record;
pub mod rules;
pub mod status;
pub mod storage;
pub mod summary;

pub use cli::{run as run_cli, Cli, Commands};
pub use pipeline::{run_repairs, RepairOptions, RepairRun, RunResult};
pub use rules::RuleSet;
pub use summary::{count_repairs, RunSummary};
