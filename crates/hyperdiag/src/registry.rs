use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::Diagnostic;

/// Callback that receives every diagnostic report.
///
/// Handlers are cheap to clone. Any user context is captured by the closure;
/// use [`Handler::with_context()`] to pair a plain function with a context
/// value.
#[derive(Clone)]
pub struct Handler(Arc<dyn Send + Sync + Fn(&Diagnostic<'_>)>);

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

impl Handler {
    /// Constructs a handler from a closure.
    pub fn new(f: impl 'static + Send + Sync + Fn(&Diagnostic<'_>)) -> Self {
        Self(Arc::new(f))
    }

    /// Constructs a handler from a function and a context value that is
    /// passed to it on every report.
    pub fn with_context<C: 'static + Send + Sync>(
        context: C,
        f: fn(&C, &Diagnostic<'_>),
    ) -> Self {
        Self::new(move |diagnostic| f(&context, diagnostic))
    }

    /// Invokes the handler.
    pub fn call(&self, diagnostic: &Diagnostic<'_>) {
        (self.0)(diagnostic);
    }
}

/// ID of a registered handler, used to unregister it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Thread-safe set of registered handlers.
///
/// Handlers are notified in registration order (oldest first). Registering
/// the same handler twice yields two IDs and two notifications per report.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    entries: RwLock<Vec<(HandlerId, Handler)>>,
}

impl HandlerRegistry {
    /// Constructs an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns an ID that can be used to unregister
    /// it.
    pub fn add(&self, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, handler));
        log::trace!("registered diagnostic handler {id}");
        id
    }

    /// Unregisters a handler. Returns `false` (and does nothing else) if it
    /// is not registered.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(i) => {
                entries.remove(i);
                log::trace!("unregistered diagnostic handler {id}");
                true
            }
            None => false,
        }
    }

    /// Registers a handler until the returned guard is dropped.
    pub fn add_scoped(&self, handler: Handler) -> HandlerGuard<'_> {
        HandlerGuard::new(self, handler)
    }

    /// Returns whether a handler is registered.
    pub fn contains(&self, id: HandlerId) -> bool {
        self.entries.read().iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
    /// Returns whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Notifies every currently registered handler exactly once.
    ///
    /// No lock is held while handlers run, so a handler may add or remove
    /// handlers or report diagnostics of its own. Such changes take effect
    /// starting with the next report.
    pub fn notify(&self, diagnostic: &Diagnostic<'_>) {
        let snapshot: SmallVec<[Handler; 4]> = self
            .entries
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in &snapshot {
            handler.call(diagnostic);
        }
    }
}

/// Unregisters a handler when dropped.
///
/// Returned by [`HandlerRegistry::add_scoped()`].
#[must_use = "the handler is unregistered as soon as the guard is dropped"]
#[derive(Debug)]
pub struct HandlerGuard<'a> {
    registry: &'a HandlerRegistry,
    id: HandlerId,
}

impl<'a> HandlerGuard<'a> {
    fn new(registry: &'a HandlerRegistry, handler: Handler) -> Self {
        let id = registry.add(handler);
        Self { registry, id }
    }

    /// Returns the ID of the registered handler.
    pub fn id(&self) -> HandlerId {
        self.id
    }
}

impl Drop for HandlerGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Location, Severity};

    fn diagnostic(error: &str) -> Diagnostic<'_> {
        Diagnostic {
            location: Location::new("f", "test.rs", 1),
            error,
            message: "",
            severity: Severity::Error,
        }
    }

    fn recording_handler(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Handler {
        let log = Arc::clone(log);
        Handler::new(move |d| log.lock().push(format!("{name}: {}", d.error)))
    }

    #[test]
    fn test_add_notify_remove() {
        let registry = HandlerRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));

        let h1 = registry.add(recording_handler(&log, "h1"));
        let h2 = registry.add(recording_handler(&log, "h2"));
        assert_eq!(registry.len(), 2);

        registry.notify(&diagnostic("a"));
        assert!(registry.remove(h1));
        registry.notify(&diagnostic("b"));
        assert!(registry.remove(h2));
        registry.notify(&diagnostic("c"));

        assert_eq!(*log.lock(), ["h1: a", "h2: a", "h2: b"]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let registry = HandlerRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));
        let id = registry.add(recording_handler(&log, "h"));
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(!registry.contains(id));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = HandlerRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));
        let handler = recording_handler(&log, "h");

        let first = registry.add(handler.clone());
        let second = registry.add(handler);
        assert_ne!(first, second);

        registry.notify(&diagnostic("x"));
        assert_eq!(log.lock().len(), 2);

        registry.remove(first);
        registry.notify(&diagnostic("y"));
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_scoped_registration() {
        let registry = HandlerRegistry::new();
        let log = Arc::new(Mutex::new(vec![]));
        let outer = registry.add(recording_handler(&log, "outer"));
        {
            let guard = registry.add_scoped(recording_handler(&log, "scoped"));
            assert!(registry.contains(guard.id()));
            registry.notify(&diagnostic("a"));
        }
        registry.notify(&diagnostic("b"));
        assert_eq!(*log.lock(), ["outer: a", "scoped: a", "outer: b"]);
        assert!(registry.contains(outer));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_with_context() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicU64::new(0));
        registry.add(Handler::with_context(Arc::clone(&counter), |counter, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        for _ in 0..5 {
            registry.notify(&diagnostic("x"));
        }
        assert_eq!(counter.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_handler_may_modify_registry() {
        let registry = Arc::new(HandlerRegistry::new());
        let log = Arc::new(Mutex::new(vec![]));

        let inner = recording_handler(&log, "inner");
        let registry_ref = Arc::downgrade(&registry);
        let added = Arc::new(Mutex::new(None));
        let added_ref = Arc::clone(&added);
        registry.add(Handler::new(move |_| {
            if let Some(registry) = registry_ref.upgrade() {
                let mut added = added_ref.lock();
                if added.is_none() {
                    *added = Some(registry.add(inner.clone()));
                }
            }
        }));

        // The new handler is only visible starting with the next report.
        registry.notify(&diagnostic("first"));
        assert_eq!(*log.lock(), Vec::<String>::new());
        registry.notify(&diagnostic("second"));
        assert_eq!(*log.lock(), ["inner: second"]);
    }

    #[test]
    fn test_concurrent_add_remove_notify() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicU64::new(0));
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let id = registry.add(Handler::with_context(
                            Arc::clone(&counter),
                            |counter, _| {
                                counter.fetch_add(1, Ordering::Relaxed);
                            },
                        ));
                        registry.notify(&diagnostic("x"));
                        registry.remove(id);
                    }
                });
            }
        });
        assert!(registry.is_empty());
        // Each thread's own handler is registered during its own report.
        assert!(counter.load(Ordering::Relaxed) >= 400);
    }
}
