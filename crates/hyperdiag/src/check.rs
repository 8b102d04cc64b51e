//! Function API for the condition checks.
//!
//! Each method evaluates nothing itself: the caller passes the result of the
//! condition, and the method reports if it failed. The returned [`Check`] tells
//! the caller whether to take its control-flow action.
//!
//! ```
//! use hyperdiag::{Location, MemorySink, Reporter};
//!
//! let sink = MemorySink::new();
//! let reporter = Reporter::with_sink(sink.clone());
//! let loc = Location::new("demo", "demo.rs", 1);
//!
//! let mut total = 0;
//! for i in 0..5 {
//!     if reporter.check_continue(&loc, i % 2 == 1, "i % 2 == 1", "").is_failed() {
//!         continue;
//!     }
//!     total += i;
//! }
//! assert_eq!(total, 6);
//! assert_eq!(sink.lines().len(), 2);
//! ```

use std::ops::ControlFlow;

use crate::{BoundsIndex, Failure, Location, Nullable, OnceGuard, Reporter};

/// Outcome of a condition check.
#[must_use = "a failed check must be acted on by the caller"]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Check {
    /// The check passed and nothing was reported.
    Passed,
    /// The check failed and a diagnostic was reported.
    Failed,
}

impl Check {
    /// Returns whether the check failed.
    pub fn is_failed(self) -> bool {
        self == Check::Failed
    }
    /// Returns whether the check passed.
    pub fn is_passed(self) -> bool {
        self == Check::Passed
    }
}

impl From<Check> for ControlFlow<()> {
    fn from(check: Check) -> Self {
        match check {
            Check::Passed => ControlFlow::Continue(()),
            Check::Failed => ControlFlow::Break(()),
        }
    }
}

impl Reporter {
    fn check_failure(
        &self,
        location: &Location<'_>,
        failure: Option<Failure<'_>>,
        message: &str,
    ) -> Check {
        match failure {
            Some(failure) => {
                self.report_failure(location, &failure, message);
                Check::Failed
            }
            None => Check::Passed,
        }
    }

    /// Checks that `index` is in bounds for `size`. The caller should return
    /// on failure.
    pub fn check_index<I: BoundsIndex>(
        &self,
        location: &Location<'_>,
        index: I,
        size: I,
        index_expr: &str,
        size_expr: &str,
        message: &str,
    ) -> Check {
        let failure = Failure::out_of_bounds(index, size, index_expr, size_expr);
        self.check_failure(location, failure, message)
    }

    /// Checks that `index` is in bounds for `size`, and crashes if it is not.
    pub fn crash_bad_index<I: BoundsIndex>(
        &self,
        location: &Location<'_>,
        index: I,
        size: I,
        index_expr: &str,
        size_expr: &str,
        message: &str,
    ) {
        if let Some(failure) = Failure::out_of_bounds(index, size, index_expr, size_expr) {
            self.crash(location, &failure.into_fatal(), message);
        }
    }

    /// Checks that `param` is not null. The caller should return on failure.
    pub fn check_null<P: Nullable + ?Sized>(
        &self,
        location: &Location<'_>,
        param: &P,
        param_expr: &str,
        message: &str,
    ) -> Check {
        let failure = param.is_null().then_some(Failure::Null { param_expr });
        self.check_failure(location, failure, message)
    }

    /// Checks that `cond` is false. The caller should return on failure,
    /// with the value whose source text is `ret_expr` if there is one.
    pub fn check_cond(
        &self,
        location: &Location<'_>,
        cond: bool,
        cond_expr: &str,
        ret_expr: Option<&str>,
        message: &str,
    ) -> Check {
        let failure = cond.then_some(Failure::Cond {
            cond_expr,
            ret_expr,
        });
        self.check_failure(location, failure, message)
    }

    /// Checks that `cond` is false, and crashes if it is not.
    pub fn crash_cond(&self, location: &Location<'_>, cond: bool, cond_expr: &str, message: &str) {
        if cond {
            self.crash(location, &Failure::CrashCond { cond_expr }, message);
        }
    }

    /// Checks that `cond` is false. The caller should continue with the next
    /// loop iteration on failure.
    pub fn check_continue(
        &self,
        location: &Location<'_>,
        cond: bool,
        cond_expr: &str,
        message: &str,
    ) -> Check {
        let failure = cond.then_some(Failure::Continue { cond_expr });
        self.check_failure(location, failure, message)
    }

    /// Checks that `cond` is false. The caller should break out of the loop on
    /// failure.
    pub fn check_break(
        &self,
        location: &Location<'_>,
        cond: bool,
        cond_expr: &str,
        message: &str,
    ) -> Check {
        let failure = cond.then_some(Failure::Break { cond_expr });
        self.check_failure(location, failure, message)
    }

    /// Reports an unconditional failure. Always returns [`Check::Failed`].
    pub fn fail(&self, location: &Location<'_>, ret_expr: Option<&str>, message: &str) -> Check {
        self.check_failure(location, Some(Failure::Fail { ret_expr }), message)
    }

    /// Reports an unconditional failure and crashes.
    pub fn crash_now(&self, location: &Location<'_>, message: &str) -> ! {
        self.crash(location, &Failure::CrashNow, message)
    }

    /// Warns about deprecated usage, only the first time `guard` is used.
    pub fn warn_deprecated(&self, guard: &OnceGuard, location: &Location<'_>, message: &str) {
        if guard.first() {
            self.report_failure(location, &Failure::Deprecated, message);
        }
    }

    /// Warns about deprecated usage, only the first time this reporter sees
    /// `location`.
    pub fn warn_deprecated_at(&self, location: Location<'static>, message: &str) {
        if self.first_at(location) {
            self.report_failure(&location, &Failure::Deprecated, message);
        }
    }
}
