use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::Location;

/// Latch for a single call site that lets a diagnostic through only the first
/// time it is reached.
///
/// Declare it as a `static` at the call site. The latch never resets.
#[derive(Debug, Default)]
pub struct OnceGuard {
    done: AtomicBool,
}

impl OnceGuard {
    /// Constructs a guard that has not been used yet.
    pub const fn new() -> Self {
        Self {
            done: AtomicBool::new(false),
        }
    }

    /// Returns `true` exactly once: for the first caller, even if several
    /// threads race to be first.
    pub fn first(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }

    /// Returns whether the guard has already let a diagnostic through.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Set of call sites that have already reported, for callers that cannot
/// declare a `static` [`OnceGuard`].
#[derive(Debug, Default)]
pub struct OnceTable {
    seen: Mutex<HashSet<Location<'static>>>,
}

impl OnceTable {
    /// Constructs an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `location` is passed in and `false` every
    /// time after that.
    pub fn first(&self, location: Location<'static>) -> bool {
        self.seen.lock().insert(location)
    }
}
