//! Sink for non-fatal pipeline diagnostics
//!
//! Invalid descriptors, repeated externals and colliding entry names never
//! abort a run; they are reported here instead.

use bundlegen_logger as logger;
use parking_lot::Mutex;

pub trait Diagnostics {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards diagnostics to the console/file logger
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn info(&self, message: &str) {
        logger::info(message);
    }

    fn warn(&self, message: &str) {
        logger::warn(message);
    }

    fn error(&self, message: &str) {
        logger::error(message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Keeps every diagnostic in memory, for callers that inspect them
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.at(Level::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.at(Level::Error)
    }

    fn at(&self, level: Level) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.records.lock().push((level, message.to_string()));
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
