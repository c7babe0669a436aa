//! Diagnostics sink handed to every component at construction

use std::sync::Arc;

/// Receives the step-by-step account of what a component did.
///
/// Components never write to stdout/stderr themselves; they report here and
/// the caller decides whether anything is shown.
pub trait Diagnostics {
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
}

/// Shared handle so one sink can be given to several components.
pub type SharedDiagnostics = Arc<dyn Diagnostics + Send + Sync>;

/// Discards everything. The default for all components.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn error(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
}

/// Forwards to the `log` facade under the `fontctl` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn error(&self, message: &str) {
        log::error!(target: "fontctl", "{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!(target: "fontctl", "{message}");
    }

    fn info(&self, message: &str) {
        log::info!(target: "fontctl", "{message}");
    }
}

pub fn noop() -> SharedDiagnostics {
    Arc::new(NoopDiagnostics)
}

/// Keeps every message in memory; handy for asserting on warnings.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    entries: std::sync::Mutex<Vec<(Level, String)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Info,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        // A poisoned log is still a log.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_keeps_levels_apart() {
        let diag = RecordingDiagnostics::new();
        diag.info("one");
        diag.warn("two");
        diag.error("three");
        diag.warn("four");

        assert_eq!(diag.messages(Level::Warn), vec!["two", "four"]);
        assert_eq!(diag.messages(Level::Error), vec!["three"]);
        assert_eq!(diag.entries().len(), 4);
    }
}
