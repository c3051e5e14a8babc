//
// logging.rs
// Dicom-Repair-rs
//
// Installs the tracing subscriber used for diagnostics; the status stream itself goes to stdout.
//
// Thales Matheus Mendonça Santos - November 2025

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}
