use std::path::{Path, PathBuf};
use std::vec;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{FileOutcome, OutcomeKind};
use crate::record::Record;
use crate::rules::RuleSet;
use crate::status::{LogSink, RunContext, StatusSink};
use crate::storage::OutputStore;
use crate::summary::RunSummary;

/// The three selections made by the user for a run.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub recurse: bool,
}

/// Files under `dir`, sorted by name; nested directories only when `recurse` is set.
pub fn discover_files(dir: &Path, recurse: bool) -> Vec<PathBuf> {
    let max_depth = if recurse { usize::MAX } else { 1 };
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .collect()
}

/// A run in progress. Each call to `next` checks, repairs and saves one file.
pub struct RepairRun<'r, 's> {
    files: vec::IntoIter<PathBuf>,
    rules: &'r RuleSet,
    store: OutputStore,
    ctx: RunContext<'s>,
}

impl<'r, 's> RepairRun<'r, 's> {
    pub fn start(
        options: &RepairOptions,
        rules: &'r RuleSet,
        sink: &'s mut dyn StatusSink,
    ) -> Result<Self> {
        if !options.input_dir.is_dir() {
            bail!("Input directory {:?} does not exist", options.input_dir);
        }
        let store = OutputStore::new(&options.output_dir)?;

        let files = discover_files(&options.input_dir, options.recurse);
        info!(
            input = %options.input_dir.display(),
            output = %store.root().display(),
            recurse = options.recurse,
            files = files.len(),
            "starting repair run"
        );

        let mut ctx = RunContext::new(sink);
        ctx.set_total(files.len());

        Ok(Self {
            files: files.into_iter(),
            rules,
            store,
            ctx,
        })
    }

    /// Deliver the summary to the sink and return the log with its aggregate.
    pub fn finish(self) -> (Vec<String>, RunSummary) {
        info!(checked = self.ctx.checked(), "repair run finished");
        self.ctx.finish()
    }

    fn process(&mut self, path: PathBuf) -> FileOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.ctx.begin_file(&name);

        let mut record = match Record::open(&path) {
            Ok(record) => record,
            Err(err) => {
                debug!(file = %path.display(), error = %err, "not a DICOM file");
                self.ctx
                    .log(format!("{name} did not contain valid DICOM data. Skipped."));
                return FileOutcome::new(
                    path,
                    OutcomeKind::ParseFailed {
                        reason: err.to_string(),
                    },
                );
            }
        };

        if let Err(rejection) = self.rules.apply(&mut record, &mut self.ctx) {
            return FileOutcome::new(
                path,
                OutcomeKind::Rejected {
                    rule: rejection.rule.to_string(),
                },
            );
        }

        match self.store.save(&record) {
            Ok(output) => {
                debug!(file = %path.display(), output = %output.display(), "saved");
                FileOutcome::new(path, OutcomeKind::Saved { output })
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "save failed");
                self.ctx.log(format!("{name} could not be saved. {err}"));
                FileOutcome::new(
                    path,
                    OutcomeKind::WriteFailed {
                        reason: err.to_string(),
                    },
                )
            }
        }
    }
}

impl Iterator for RepairRun<'_, '_> {
    type Item = FileOutcome;

    fn next(&mut self) -> Option<FileOutcome> {
        if self.ctx.is_cancelled() {
            info!(checked = self.ctx.checked(), "repair run cancelled");
            return None;
        }
        let path = self.files.next()?;
        Some(self.process(path))
    }
}

/// Outcomes, raw log and summary of a completed run.
#[derive(Debug)]
pub struct RunResult {
    pub outcomes: Vec<FileOutcome>,
    pub log: Vec<String>,
    pub summary: RunSummary,
}

/// Repair every file under the input directory and write the survivors to the output directory.
pub fn run_repairs(
    options: &RepairOptions,
    rules: &RuleSet,
    sink: &mut dyn StatusSink,
) -> Result<RunResult> {
    let mut run = RepairRun::start(options, rules, sink)?;
    let outcomes: Vec<FileOutcome> = run.by_ref().collect();
    let (log, summary) = run.finish();
    Ok(RunResult {
        outcomes,
        log,
        summary,
    })
}
