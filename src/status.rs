//
// status.rs
// Dicom-Repair-rs
//
// Status sinks for the live message stream and the run context that owns the repair log and progress counters.
//
// Thales Matheus Mendonça Santos - November 2025

use crate::summary::RunSummary;

/// Consumer of status messages and progress signals (console, GUI, test recorder).
pub trait StatusSink {
    fn update(&mut self, message: &str, current: Option<usize>, max: Option<usize>);

    /// Checked between files; returning `false` stops the run before the next file.
    fn is_open(&self) -> bool {
        true
    }
}

/// Where repair rules push their log lines.
pub trait LogSink {
    fn log(&mut self, message: String);
}

impl LogSink for Vec<String> {
    fn log(&mut self, message: String) {
        self.push(message);
    }
}

/// Prints status lines to stdout, prefixed with `[current/max]` on progress ticks.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    max: Option<usize>,
}

impl StatusSink for ConsoleSink {
    fn update(&mut self, message: &str, current: Option<usize>, max: Option<usize>) {
        if max.is_some() {
            self.max = max;
        }
        match (current, self.max) {
            (Some(current), Some(max)) => println!("[{current}/{max}] {message}"),
            (Some(current), None) => println!("[{current}] {message}"),
            _ => println!("{message}"),
        }
    }
}

/// Discards everything; useful when only the returned outcomes matter.
#[derive(Debug, Default)]
pub struct SilentSink;

impl StatusSink for SilentSink {
    fn update(&mut self, _message: &str, _current: Option<usize>, _max: Option<usize>) {}
}

/// Mutable state of one run: the growing log, the progress counters and the sink they feed.
pub struct RunContext<'s> {
    entries: Vec<String>,
    checked: usize,
    sink: &'s mut dyn StatusSink,
}

impl<'s> RunContext<'s> {
    pub fn new(sink: &'s mut dyn StatusSink) -> Self {
        Self {
            entries: Vec::new(),
            checked: 0,
            sink,
        }
    }

    /// Announce the number of discovered files and reset the progress bar to it.
    pub fn set_total(&mut self, total: usize) {
        self.checked = 0;
        self.emit(format!("Found {total} files"), None, Some(total));
    }

    /// Log the per-file marker; it doubles as the progress tick.
    pub fn begin_file(&mut self, name: &str) {
        self.checked += 1;
        let checked = self.checked;
        self.emit(format!("Checking file {name}"), Some(checked), None);
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn is_cancelled(&self) -> bool {
        !self.sink.is_open()
    }

    /// Aggregate the log, hand the report to the sink and give back the raw entries.
    pub fn finish(self) -> (Vec<String>, RunSummary) {
        let summary = RunSummary::from_log(&self.entries);
        self.sink.update(&summary.to_string(), None, None);
        (self.entries, summary)
    }

    fn emit(&mut self, message: String, current: Option<usize>, max: Option<usize>) {
        // Empty messages would only add blank lines to the summary.
        if message.is_empty() {
            return;
        }
        self.sink.update(&message, current, max);
        self.entries.push(message);
    }
}

impl LogSink for RunContext<'_> {
    fn log(&mut self, message: String) {
        self.emit(message, None, None);
    }
}
