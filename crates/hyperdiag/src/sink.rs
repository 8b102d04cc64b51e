use std::io::Write;
use std::sync::Arc;

use owo_colors::{OwoColorize, Style};
use parking_lot::{Mutex, MutexGuard};

use crate::{Diagnostic, OwnedDiagnostic, Severity};

/// Destination for formatted diagnostics, written before any handler is
/// notified.
///
/// Sinks must not panic if their destination is unavailable.
pub trait Sink: Send + Sync {
    /// Writes a diagnostic.
    fn write(&self, diagnostic: &Diagnostic<'_>);
}

/// Sink that writes to standard error.
///
/// Each diagnostic takes two lines:
///
/// ```text
/// ERROR: src/lib.rs:10 - Condition "x > 2" is true.: explanation
///    at: my_crate::my_function
/// ```
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct StderrSink {
    /// Whether to color the output using ANSI escape codes.
    pub color: bool,
}

impl StderrSink {
    /// Constructs a sink that writes plain text.
    pub fn plain() -> Self {
        Self { color: false }
    }
    /// Constructs a sink that writes colored text.
    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Formats a diagnostic the way this sink writes it, including the
    /// trailing newline.
    pub fn format(&self, diagnostic: &Diagnostic<'_>) -> String {
        let label = diagnostic.severity.to_string();
        let mut out = if self.color {
            format!("{}: {diagnostic}\n", label.style(label_style(diagnostic.severity)))
        } else {
            format!("{label}: {diagnostic}\n")
        };
        if !diagnostic.location.function.is_empty() {
            let at = format!("   at: {}", diagnostic.location.function);
            if self.color {
                out += &at.dimmed().to_string();
            } else {
                out += &at;
            }
            out += "\n";
        }
        out
    }
}

impl Sink for StderrSink {
    fn write(&self, diagnostic: &Diagnostic<'_>) {
        // There's nowhere to report a failure to write to stderr.
        let _ = std::io::stderr()
            .lock()
            .write_all(self.format(diagnostic).as_bytes());
    }
}

fn label_style(severity: Severity) -> Style {
    match severity {
        Severity::Warning => Style::new().yellow().bold(),
        Severity::Error | Severity::Script | Severity::Shader => Style::new().red().bold(),
    }
}

/// Sink that forwards diagnostics to the [`log`] facade with target
/// `hyperdiag`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LogSink;

impl Sink for LogSink {
    fn write(&self, diagnostic: &Diagnostic<'_>) {
        let level = diagnostic.severity.log_level();
        if diagnostic.location.function.is_empty() {
            log::log!(target: "hyperdiag", level, "{diagnostic}");
        } else {
            log::log!(
                target: "hyperdiag",
                level,
                "{diagnostic} (at {})",
                diagnostic.location.function,
            );
        }
    }
}

/// Sink that discards everything. Handlers are still notified.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SilentSink;

impl Sink for SilentSink {
    fn write(&self, _diagnostic: &Diagnostic<'_>) {}
}

/// Sink that keeps every diagnostic in memory.
///
/// Clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<OwnedDiagnostic>>>,
}

impl MemorySink {
    /// Constructs an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all the diagnostics so far.
    pub fn lines(&self) -> MutexGuard<'_, Vec<OwnedDiagnostic>> {
        self.lines.lock()
    }
    /// Removes and returns all the diagnostics so far.
    pub fn take(&self) -> Vec<OwnedDiagnostic> {
        std::mem::take(&mut *self.lines.lock())
    }
    /// Clears all diagnostics.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, diagnostic: &Diagnostic<'_>) {
        self.lines.lock().push(diagnostic.to_owned_diagnostic());
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, diagnostic: &Diagnostic<'_>) {
        S::write(self, diagnostic);
    }
}
