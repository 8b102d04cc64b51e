use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::{
    Config, Diagnostic, Failure, Handler, HandlerGuard, HandlerId, HandlerRegistry, Location,
    MessageMode, OnceGuard, OnceTable, Severity, Sink,
};

lazy_static! {
    /// Process-wide reporter, configured from [`Config::load()`] on first use.
    static ref REPORTER: Reporter = Reporter::from_config(&Config::load());
}

/// Returns the process-wide reporter used by the check macros.
pub fn reporter() -> &'static Reporter {
    &REPORTER
}

/// Formats diagnostics and dispatches them to a default sink and to every
/// registered handler.
///
/// Most code should use the process-wide [`reporter()`] through the check
/// macros. Separate reporters are useful for isolated subsystems and tests.
pub struct Reporter {
    sink: RwLock<Arc<dyn Sink>>,
    handlers: HandlerRegistry,
    messages: MessageMode,
    once_table: OnceTable,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("handlers", &self.handlers)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Reporter {
    /// Constructs a reporter with a default sink and the message mode of the
    /// current build.
    pub fn with_sink(sink: impl Sink + 'static) -> Self {
        Self::with_shared_sink(Arc::new(sink))
    }
    fn with_shared_sink(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink: RwLock::new(sink),
            handlers: HandlerRegistry::new(),
            messages: MessageMode::BUILD,
            once_table: OnceTable::new(),
        }
    }
    /// Constructs a reporter using a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_shared_sink(config.build_sink())
    }
    /// Overrides the message mode.
    #[must_use]
    pub fn with_message_mode(mut self, messages: MessageMode) -> Self {
        self.messages = messages;
        self
    }

    /// Returns the message mode.
    pub fn message_mode(&self) -> MessageMode {
        self.messages
    }
    /// Replaces the default sink.
    pub fn set_sink(&self, sink: impl Sink + 'static) {
        *self.sink.write() = Arc::new(sink);
    }

    /// Returns the handler registry.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }
    /// Registers a handler. The same handler may be registered more than once,
    /// in which case it is notified once per registration.
    pub fn add_handler(&self, handler: Handler) -> HandlerId {
        self.handlers.add(handler)
    }
    /// Unregisters a handler. Does nothing if it is not registered.
    pub fn remove_handler(&self, id: HandlerId) {
        self.handlers.remove(id);
    }
    /// Registers a handler that is unregistered when the returned guard is
    /// dropped.
    pub fn add_scoped_handler(&self, handler: Handler) -> HandlerGuard<'_> {
        self.handlers.add_scoped(handler)
    }

    /// Reports a diagnostic with no explanation.
    pub fn report(&self, location: &Location<'_>, error: &str, severity: Severity) {
        self.report_with_message(location, error, "", severity);
    }

    /// Reports a diagnostic: writes it to the default sink, then notifies
    /// every registered handler exactly once.
    pub fn report_with_message(
        &self,
        location: &Location<'_>,
        error: &str,
        message: &str,
        severity: Severity,
    ) {
        let diagnostic = Diagnostic {
            location: *location,
            error,
            message,
            severity,
        };
        let sink = Arc::clone(&*self.sink.read());
        sink.write(&diagnostic);
        self.handlers.notify(&diagnostic);
    }

    /// Reports an out-of-bounds index, including the source text of the index
    /// and size expressions.
    ///
    /// `fatal` only changes the text. It does not terminate the process.
    pub fn report_index_error(
        &self,
        location: &Location<'_>,
        index: i128,
        size: i128,
        index_expr: &str,
        size_expr: &str,
        message: &str,
        fatal: bool,
    ) {
        let failure = Failure::Index {
            index,
            size,
            index_expr,
            size_expr,
            fatal,
        };
        self.report_with_message(location, &failure.to_string(), message, Severity::Error);
    }

    /// Reports a failed check. The message is stripped according to the
    /// message mode.
    #[cold]
    pub fn report_failure(&self, location: &Location<'_>, failure: &Failure<'_>, message: &str) {
        let message = self.messages.apply(message);
        match *failure {
            Failure::Index {
                index,
                size,
                index_expr,
                size_expr,
                fatal,
            } => self.report_index_error(
                location, index, size, index_expr, size_expr, message, fatal,
            ),
            _ => self.report_with_message(
                location,
                &failure.to_string(),
                message,
                failure.severity(),
            ),
        }
    }

    /// Reports a failed check and then terminates the process.
    ///
    /// The report always happens first, reaching the default sink and every
    /// handler. The process is aborted without unwinding. `failure` must be
    /// one of the fatal kinds (see [`Failure::is_fatal()`]).
    #[cold]
    pub fn crash(&self, location: &Location<'_>, failure: &Failure<'_>, message: &str) -> ! {
        debug_assert!(failure.is_fatal(), "non-fatal failure on crash path: {failure}");
        self.report_failure(location, failure, message);
        trap()
    }

    /// Reports a message without affecting control flow. The message itself is
    /// the error text, so nothing but the location remains if messages are
    /// stripped.
    ///
    /// A stripped report has an empty error text and is formatted as
    /// `<file>:<line> - ` with nothing after the separator.
    pub fn print(&self, location: &Location<'_>, message: &str, severity: Severity) {
        self.report(location, self.messages.apply(message), severity);
    }

    /// Same as [`Reporter::print()`], but only the first time `guard` is used.
    pub fn print_once(
        &self,
        guard: &OnceGuard,
        location: &Location<'_>,
        message: &str,
        severity: Severity,
    ) {
        if guard.first() {
            self.print(location, message, severity);
        }
    }

    /// Returns `true` the first time a call site is passed in, according to the
    /// reporter's own once-table.
    pub(crate) fn first_at(&self, location: Location<'static>) -> bool {
        self.once_table.first(location)
    }
}

/// Terminates the process immediately.
///
/// Only reachable through the fatal paths.
fn trap() -> ! {
    log::logger().flush();
    std::process::abort()
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{MemorySink, OwnedDiagnostic, SilentSink};

    const LOC: Location<'static> = Location::new("tests::f", "src/f.rs", 12);

    #[test]
    fn test_report_reaches_sink_then_handlers() {
        let sink = MemorySink::new();
        let reporter = Reporter::with_sink(sink.clone());
        let seen = Arc::new(Mutex::new(vec![]));

        let sink_ref = sink.clone();
        let seen_ref = Arc::clone(&seen);
        reporter.add_handler(Handler::new(move |d| {
            // The sink has already been written when the handler runs.
            assert_eq!(sink_ref.lines().last(), Some(&d.to_owned_diagnostic()));
            seen_ref.lock().push(d.to_owned_diagnostic());
        }));

        reporter.report(&LOC, "plain", Severity::Warning);
        reporter.report_with_message(&LOC, "with message", "why", Severity::Script);

        let expected = vec![
            OwnedDiagnostic {
                function: "tests::f".to_owned(),
                file: "src/f.rs".to_owned(),
                line: 12,
                error: "plain".to_owned(),
                message: String::new(),
                severity: Severity::Warning,
            },
            OwnedDiagnostic {
                function: "tests::f".to_owned(),
                file: "src/f.rs".to_owned(),
                line: 12,
                error: "with message".to_owned(),
                message: "why".to_owned(),
                severity: Severity::Script,
            },
        ];
        assert_eq!(*seen.lock(), expected);
        assert_eq!(*sink.lines(), expected);
    }

    #[test]
    fn test_removed_handler_is_not_notified() {
        let reporter = Reporter::with_sink(SilentSink);
        let count = Arc::new(Mutex::new(0));
        let count_ref = Arc::clone(&count);
        let id = reporter.add_handler(Handler::new(move |_| *count_ref.lock() += 1));

        for _ in 0..3 {
            reporter.report(&LOC, "x", Severity::Error);
        }
        reporter.remove_handler(id);
        for _ in 0..3 {
            reporter.report(&LOC, "x", Severity::Error);
        }
        assert_eq!(*count.lock(), 3);
    }

    #[test]
    fn test_index_error_text() {
        let sink = MemorySink::new();
        let reporter = Reporter::with_sink(sink.clone());
        reporter.report_index_error(&LOC, 5, 3, "i", "n", "", false);
        reporter.report_index_error(&LOC, -1, 3, "i", "n", "bad slot", true);

        let lines = sink.take();
        assert_eq!(lines[0].error, "Index i = 5 is out of bounds (n = 3).");
        assert_eq!(lines[0].severity, Severity::Error);
        assert_eq!(
            lines[1].to_string(),
            "src/f.rs:12 - FATAL: Index i = -1 is out of bounds (n = 3).: bad slot",
        );
    }

    #[test]
    fn test_stripping_keeps_structure() {
        let sink = MemorySink::new();
        let reporter =
            Reporter::with_sink(sink.clone()).with_message_mode(MessageMode::Strip);
        let failure = Failure::Cond {
            cond_expr: "x > 2",
            ret_expr: None,
        };
        reporter.report_failure(&LOC, &failure, "first explanation");
        reporter.report_failure(&LOC, &failure, "a completely different explanation");
        reporter.print(&LOC, "printed", Severity::Warning);

        let lines = sink.take();
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[0].to_string(), "src/f.rs:12 - Condition \"x > 2\" is true.");
        assert_eq!(lines[2].error, "");
        assert_eq!(lines[2].severity, Severity::Warning);
    }

    #[test]
    fn test_stripped_print_formats_location_only() {
        let sink = MemorySink::new();
        let reporter =
            Reporter::with_sink(sink.clone()).with_message_mode(MessageMode::Strip);
        reporter.print(&LOC, "gone", Severity::Error);
        assert_eq!(sink.take()[0].to_string(), "src/f.rs:12 - ");
    }

    #[test]
    fn test_report_failure_keeps_message() {
        let sink = MemorySink::new();
        let reporter = Reporter::with_sink(sink.clone()).with_message_mode(MessageMode::Keep);
        reporter.report_failure(&LOC, &Failure::Deprecated, "use bar() instead");
        let line = &sink.lines()[0];
        assert_eq!(line.severity, Severity::Warning);
        assert_eq!(line.message, "use bar() instead");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic = "non-fatal failure on crash path"]
    fn test_crash_rejects_non_fatal_failure() {
        let reporter = Reporter::with_sink(SilentSink);
        reporter.crash(&LOC, &Failure::Deprecated, "");
    }

    #[test]
    fn test_set_sink() {
        let first = MemorySink::new();
        let second = MemorySink::new();
        let reporter = Reporter::with_sink(first.clone());
        reporter.report(&LOC, "a", Severity::Error);
        reporter.set_sink(second.clone());
        reporter.report(&LOC, "b", Severity::Error);
        assert_eq!(first.lines().len(), 1);
        assert_eq!(second.lines().len(), 1);
    }

    #[test]
    fn test_scoped_handler() {
        let reporter = Reporter::with_sink(SilentSink);
        {
            let _guard = reporter.add_scoped_handler(Handler::new(|_| ()));
            assert_eq!(reporter.handlers().len(), 1);
        }
        assert!(reporter.handlers().is_empty());
    }
}
