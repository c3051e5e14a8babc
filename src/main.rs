//
// main.rs
// Dicom-Repair-rs
//
// Binary entry point that hands off execution to the CLI layer.
//
// Thales Matheus Mendonça Santos - November 2025

use dicom_repair::cli;

fn main() -> anyhow::Result<()> {
    cli::run()
}
