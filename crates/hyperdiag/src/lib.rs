//! Diagnostic reporting and condition checks.
//!
//! Code that detects an invalid state reports it uniformly (function, file,
//! line, condition text, optional explanation, severity) and then takes one of
//! a small set of locally-decided actions: return early, skip or abort a loop
//! iteration, or terminate the process.
//!
//! Unlike `assert!()`, these checks fire when the condition is **true**. Most
//! failures are recoverable: the enclosing function bails out with a sensible
//! value and the program keeps running. Only the `crash_*` family terminates.
//!
//! # Example
//!
//! ```
//! use hyperdiag::{err_continue, fail_cond, fail_index};
//!
//! fn nth_square(values: &[i32], i: usize) -> Option<i32> {
//!     fail_index!(i, values.len() => None; "no value to square");
//!     Some(values[i] * values[i])
//! }
//!
//! fn sum_positive(values: &[i32]) -> i32 {
//!     let mut sum = 0;
//!     for &v in values {
//!         err_continue!(v < 0; "skipping negative value {v}");
//!         sum += v;
//!     }
//!     sum
//! }
//!
//! fn set_volume(volume: &mut f32, new_volume: f32) {
//!     fail_cond!(!(0.0..=1.0).contains(&new_volume));
//!     *volume = new_volume;
//! }
//!
//! assert_eq!(nth_square(&[1, 2, 3], 2), Some(9));
//! assert_eq!(nth_square(&[1, 2, 3], 5), None);
//! assert_eq!(sum_positive(&[1, -2, 3]), 4);
//! ```
//!
//! # Handlers
//!
//! Every report goes to the default sink and then to every registered handler
//! exactly once, in registration order.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let count = Arc::new(AtomicUsize::new(0));
//! let id = hyperdiag::add_handler(hyperdiag::Handler::with_context(
//!     Arc::clone(&count),
//!     |count, _diagnostic| {
//!         count.fetch_add(1, Ordering::Relaxed);
//!     },
//! ));
//! hyperdiag::err_print!("something happened");
//! hyperdiag::remove_handler(id);
//! hyperdiag::err_print!("nobody is listening");
//! assert!(count.load(Ordering::Relaxed) >= 1);
//! ```

#[cfg(test)]
use pretty_assertions as _; // Suppress unused crate warning (it's used in some tests)

#[macro_use]
mod macros;
mod check;
mod config;
mod diagnostic;
mod failure;
mod location;
mod once;
mod registry;
mod reporter;
mod severity;
mod sink;
mod strip;

pub use check::Check;
pub use self::config::{ColorChoice, Config, ConfigError, SinkKind};
pub use diagnostic::{Diagnostic, OwnedDiagnostic};
pub use failure::{BoundsIndex, Failure, Nullable};
pub use location::{Location, trim_function_name};
pub use once::{OnceGuard, OnceTable};
pub use registry::{Handler, HandlerGuard, HandlerId, HandlerRegistry};
pub use reporter::{Reporter, reporter};
pub use severity::Severity;
pub use sink::{LogSink, MemorySink, SilentSink, Sink, StderrSink};
pub use strip::MessageMode;

/// Registers a handler with the process-wide reporter.
///
/// See [`Reporter::add_handler()`].
pub fn add_handler(handler: Handler) -> HandlerId {
    reporter().add_handler(handler)
}

/// Unregisters a handler from the process-wide reporter. Does nothing if the
/// handler is not registered.
///
/// See [`Reporter::remove_handler()`].
pub fn remove_handler(id: HandlerId) {
    reporter().remove_handler(id);
}

/// Reports a diagnostic with no explanation to the process-wide reporter.
pub fn report(location: &Location<'_>, error: &str, severity: Severity) {
    reporter().report(location, error, severity);
}

/// Reports a diagnostic with an explanation to the process-wide reporter.
pub fn report_with_message(
    location: &Location<'_>,
    error: &str,
    message: &str,
    severity: Severity,
) {
    reporter().report_with_message(location, error, message, severity);
}

/// Reports an out-of-bounds index to the process-wide reporter.
///
/// See [`Reporter::report_index_error()`].
pub fn report_index_error(
    location: &Location<'_>,
    index: i128,
    size: i128,
    index_expr: &str,
    size_expr: &str,
    message: &str,
    fatal: bool,
) {
    reporter().report_index_error(location, index, size, index_expr, size_expr, message, fatal);
}
