//
// cli.rs
// Dicom-Repair-rs
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the repair pipeline.
//
// Thales Matheus Mendonça Santos - November 2025

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::logging;
use crate::models::RunReport;
use crate::pipeline::{run_repairs, RepairOptions};
use crate::record::Record;
use crate::rules::RuleSet;
use crate::status::ConsoleSink;
use crate::storage::output_file_name;

/// Command-line interface glue code: collects the folders and dispatches to the pipeline.
#[derive(Parser)]
#[command(name = "dicom-repair")]
#[command(about = "Repara metadados DICOM que bloqueiam a importação", long_about = None)]
pub struct Cli {
    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Repair every DICOM file in a directory and save the copies to another
    Repair {
        #[arg(short, long, env = "DICOM_REPAIR_INPUT")]
        input: PathBuf,
        #[arg(short, long, env = "DICOM_REPAIR_OUTPUT")]
        output: PathBuf,
        /// Only look at files directly inside the input directory
        #[arg(long)]
        no_recurse: bool,
        /// Write a JSON report of every file outcome
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List the repairs a single file would receive, without writing anything
    Inspect { file: PathBuf },
}

pub fn run() -> Result<()> {
    // Parse the raw CLI arguments once and dispatch to a subcommand handler.
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Repair {
            input,
            output,
            no_recurse,
            report,
        } => {
            let options = RepairOptions {
                input_dir: input,
                output_dir: output,
                recurse: !no_recurse,
            };
            repair(&options, report.as_deref())?
        }
        Commands::Inspect { file } => inspect(&file)?,
    }

    Ok(())
}

fn repair(options: &RepairOptions, report_path: Option<&Path>) -> Result<()> {
    let started_at = chrono::Local::now().to_rfc3339();
    let rules = RuleSet::default();
    let mut sink = ConsoleSink::default();
    let result = run_repairs(options, &rules, &mut sink)?;

    if let Some(path) = report_path {
        let report = RunReport {
            started_at,
            finished_at: chrono::Local::now().to_rfc3339(),
            input_dir: options.input_dir.clone(),
            output_dir: options.output_dir.clone(),
            recurse: options.recurse,
            files: result.outcomes,
            summary: result.summary,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, json).context("Failed to write report")?;
        println!("Report saved to {:?}", path);
    }

    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let mut record = Record::open(path)?;
    println!("Repairs for {:?}", path.file_name().unwrap_or(path.as_os_str()));
    for line in inspect_record(&mut record) {
        println!("  {line}");
    }
    Ok(())
}

/// Run the rules in memory and describe what a repair run would do with the record.
fn inspect_record(record: &mut Record) -> Vec<String> {
    let mut log: Vec<String> = Vec::new();
    let verdict = RuleSet::default().apply(record, &mut log);

    let mut lines: Vec<String> = log.iter().map(|l| l.replace('\t', " -> ")).collect();
    if lines.is_empty() {
        lines.push("No defects found.".to_string());
    }
    lines.push(match verdict {
        Ok(()) => format!("Would be saved as {}", output_file_name(record)),
        Err(rejection) => format!("Would be discarded by rule {}", rejection.rule),
    });
    lines
}
