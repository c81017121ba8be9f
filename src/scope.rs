//! Resource lifetimes for transducer acquisition.
//!
//! A [`Scope`] collects finalizers while transducers are acquired and runs
//! them in reverse order of registration when it closes. The driver closes the
//! scope after the final flush or after an error. If the driving stream is
//! dropped mid-push, dropping the last handle closes it instead, so
//! cancellation releases resources through the same path.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use weir::Scope;
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let scope = Scope::new();
//! for name in ["db", "file"] {
//!     let log = log.clone();
//!     scope.add_finalizer(move || log.lock().unwrap().push(name));
//! }
//! scope.close();
//! assert_eq!(*log.lock().unwrap(), vec!["file", "db"]);
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Finalizer = Box<dyn FnOnce() + Send>;

/// A handle to a stack of finalizers released in LIFO order.
///
/// Cloning a `Scope` yields another handle to the same stack. The stack is
/// closed by [`close`](Scope::close) or when the last handle is dropped,
/// whichever happens first.
#[derive(Clone, Default)]
pub struct Scope {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    /// The parent's finalizer that closes this scope, removed once this
    /// scope closes on its own.
    parent: Option<(Weak<Inner>, u64)>,
}

#[derive(Default)]
struct State {
    finalizers: Vec<(u64, Finalizer)>,
    next_id: u64,
    closed: bool,
}

impl State {
    fn reserve(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `finalizer` under `id`, or run it now if already closed.
    fn register(&self, id: u64, finalizer: Finalizer) {
        let mut state = self.lock();
        if state.closed {
            drop(state);
            finalizer();
        } else {
            state.finalizers.push((id, finalizer));
        }
    }

    fn deregister(&self, id: u64) {
        let removed = {
            let mut state = self.lock();
            state
                .finalizers
                .iter()
                .position(|(key, _)| *key == id)
                .map(|index| state.finalizers.remove(index))
        };
        drop(removed);
    }

    fn close(&self) {
        let finalizers = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            std::mem::take(&mut state.finalizers)
        };
        run_finalizers(finalizers);

        if let Some((parent, id)) = &self.parent {
            if let Some(parent) = parent.upgrade() {
                parent.deregister(*id);
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_finalizers(finalizers: Vec<(u64, Finalizer)>) {
    #[cfg(feature = "tracing")]
    tracing::trace!(count = finalizers.len(), "closing scope");

    for (_, finalizer) in finalizers.into_iter().rev() {
        finalizer();
    }
}

impl Scope {
    /// Create an open, empty scope.
    pub fn new() -> Self {
        Scope::default()
    }

    /// Register `finalizer` to run when this scope closes.
    ///
    /// If the scope is already closed the finalizer runs immediately.
    pub fn add_finalizer<F>(&self, finalizer: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.lock().reserve();
        self.inner.register(id, Box::new(finalizer));
    }

    /// Create a scope that closes no later than this one.
    ///
    /// The child can be closed on its own at any time, which also removes it
    /// from this scope. Closing the parent closes the child if it is still
    /// open.
    ///
    /// ```rust
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    /// use weir::Scope;
    ///
    /// let released = Arc::new(AtomicBool::new(false));
    /// let parent = Scope::new();
    /// let child = parent.child();
    /// let flag = released.clone();
    /// child.add_finalizer(move || flag.store(true, Ordering::SeqCst));
    ///
    /// parent.close();
    /// assert!(released.load(Ordering::SeqCst));
    /// assert!(child.is_closed());
    /// ```
    pub fn child(&self) -> Scope {
        let id = self.inner.lock().reserve();
        let child = Scope {
            inner: Arc::new(Inner {
                state: Mutex::default(),
                parent: Some((Arc::downgrade(&self.inner), id)),
            }),
        };
        let weak = Arc::downgrade(&child.inner);
        self.inner.register(
            id,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.close();
                }
            }),
        );
        child
    }

    /// Run every registered finalizer, most recent first.
    ///
    /// Closing twice is a no-op.
    pub fn close(&self) {
        self.inner.close();
    }

    /// Returns `true` once the scope has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of finalizers waiting to run.
    pub fn pending_finalizers(&self) -> usize {
        self.inner.lock().finalizers.len()
    }

    /// Run `f` with a fresh scope that is closed as soon as `f` completes.
    ///
    /// If the returned future is dropped before completion, the scope is
    /// closed by the drop.
    pub async fn using<T, F, Fut>(f: F) -> T
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = T>,
    {
        let scope = Scope::new();
        let result = f(scope.clone()).await;
        scope.close();
        result
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Scope")
            .field("finalizers", &state.finalizers.len())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Finalizer) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| -> Finalizer {
            let sink = sink.clone();
            Box::new(move || sink.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn close_runs_in_reverse_order() {
        let (log, make) = recorder();
        let scope = Scope::new();
        scope.add_finalizer(make("first"));
        scope.add_finalizer(make("second"));
        scope.add_finalizer(make("third"));

        scope.close();

        assert_eq!(*log.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[test]
    fn close_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let scope = Scope::new();
        let c = count.clone();
        scope.add_finalizer(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        scope.close();
        scope.close();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(scope.is_closed());
    }

    #[test]
    fn finalizer_added_after_close_runs_immediately() {
        let (log, make) = recorder();
        let scope = Scope::new();
        scope.close();
        scope.add_finalizer(make("late"));
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }

    #[test]
    fn dropping_last_handle_closes() {
        let (log, make) = recorder();
        let scope = Scope::new();
        let other = scope.clone();
        scope.add_finalizer(make("only"));

        drop(scope);
        assert!(log.lock().unwrap().is_empty());

        drop(other);
        assert_eq!(*log.lock().unwrap(), vec!["only"]);
    }

    #[test]
    fn child_closed_independently_is_not_closed_twice() {
        let count = Arc::new(AtomicUsize::new(0));
        let parent = Scope::new();
        let child = parent.child();
        let c = count.clone();
        child.add_finalizer(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        child.close();
        parent.close();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropped_child_leaves_parent() {
        let parent = Scope::new();
        let child = parent.child();
        assert_eq!(parent.pending_finalizers(), 1);
        drop(child);
        assert_eq!(parent.pending_finalizers(), 0);
        parent.close();
        assert!(parent.is_closed());
    }

    #[test]
    fn closed_children_do_not_accumulate() {
        let (log, make) = recorder();
        let parent = Scope::new();
        parent.add_finalizer(make("parent"));
        for _ in 0..1000 {
            let child = parent.child();
            child.add_finalizer(make("child"));
            child.close();
        }

        assert_eq!(parent.pending_finalizers(), 1);
        parent.close();
        assert_eq!(log.lock().unwrap().len(), 1001);
        assert_eq!(log.lock().unwrap().last(), Some(&"parent"));
    }

    #[test]
    fn child_of_closed_parent_is_closed() {
        let parent = Scope::new();
        parent.close();
        let child = parent.child();
        assert!(child.is_closed());
    }

    #[tokio::test]
    async fn using_closes_after_body() {
        let (log, make) = recorder();
        let value = Scope::using(|scope| async move {
            scope.add_finalizer(make("ephemeral"));
            7
        })
        .await;

        assert_eq!(value, 7);
        assert_eq!(*log.lock().unwrap(), vec!["ephemeral"]);
    }
}
