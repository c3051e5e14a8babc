//
// summary.rs
// Dicom-Repair-rs
//
// Aggregates the repair log of one run into per-action counts and renders the completion report.
//
// Thales Matheus Mendonça Santos - November 2025

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const CHECKING_MARKER: &str = "Checking file";
const DISCOVERY_PREFIX: &str = "Found ";

/// How many times one distinct log line was emitted during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairCount {
    pub found: String,
    pub action: String,
    pub files: usize,
}

/// Totals for a run, in order of first appearance in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_analyzed: usize,
    pub repairs: Vec<RepairCount>,
}

impl RunSummary {
    pub fn from_log<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut files_analyzed = 0;
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let line = match normalize(entry.as_ref()) {
                Normalized::Marker => {
                    files_analyzed += 1;
                    continue;
                }
                Normalized::Dropped => continue,
                Normalized::Line(line) => line,
            };
            match index.get(&line) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    index.insert(line.clone(), order.len());
                    order.push((line, 1));
                }
            }
        }

        let repairs = order
            .into_iter()
            .map(|(line, files)| {
                let (found, action) = match line.split_once('\t') {
                    Some((found, action)) => (found.to_string(), action.to_string()),
                    None => (line, String::new()),
                };
                RepairCount {
                    found,
                    action,
                    files,
                }
            })
            .collect();

        Self {
            files_analyzed,
            repairs,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "********  DICOM File Repair Completed  ********")?;
        writeln!(f)?;
        writeln!(f, "Number of files analyzed: {}", self.files_analyzed)?;
        write!(f, "Repairs Made:")?;
        for repair in &self.repairs {
            write!(
                f,
                "\n\tIn {} files, \n\t\t{}\n\t\t{}",
                repair.files, repair.found, repair.action
            )?;
        }
        Ok(())
    }
}

/// Render the completion report for a raw log.
pub fn count_repairs<S: AsRef<str>>(entries: &[S]) -> String {
    RunSummary::from_log(entries).to_string()
}

enum Normalized {
    Marker,
    Dropped,
    Line(String),
}

fn normalize(entry: &str) -> Normalized {
    if entry.starts_with(CHECKING_MARKER) {
        Normalized::Marker
    } else if entry.starts_with(DISCOVERY_PREFIX) {
        Normalized::Dropped
    } else {
        // Multi-line legacy values must not break the report layout.
        Normalized::Line(entry.replace(['\r', '\n'], " "))
    }
}
