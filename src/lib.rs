//! Scope-bound deferred actions.
//!
//! A [`Defer`] collects zero-argument actions while a scope runs and invokes
//! them newest-first when the scope ends, whether it returns normally, bails
//! out early with `?`, or unwinds from a panic. Failures raised by the actions
//! are logged through `tracing` and discarded so that every action gets its
//! turn.
//!
//! Registries are recycled through a [`DeferPool`]. The process-wide pool is
//! used by default and is safe to share between threads; an individual
//! `Defer` belongs to the scope that acquired it.
//!
//! ```
//! use deferstack::defer;
//! use std::sync::{Arc, Mutex};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! {
//!     let l = log.clone();
//!     let mut scope = defer(move || l.lock().unwrap().push("closed file"));
//!     let l = log.clone();
//!     scope.register(move || l.lock().unwrap().push("released lock"));
//! }
//! assert_eq!(*log.lock().unwrap(), ["released lock", "closed file"]);
//! ```

mod action;
pub mod pool;
pub mod registry;

pub use deferstack_core::{ActionFailure, Error, PoolConfig, Result};
pub use pool::DeferPool;
pub use registry::{defer, Defer, EarlyDrain};

/// Defer the given statements to the end of the enclosing scope.
///
/// Expands to a [`Defer`] with the statements as its first action, so the
/// result must be bound to a named variable. Binding it to `_` drops it, and
/// runs the statements, straight away.
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let done = Arc::new(AtomicBool::new(false));
/// {
///     let flag = done.clone();
///     let _guard = deferstack::defer!(flag.store(true, Ordering::SeqCst));
///     assert!(!done.load(Ordering::SeqCst));
/// }
/// assert!(done.load(Ordering::SeqCst));
/// ```
#[macro_export]
macro_rules! defer {
    ($($body:tt)*) => {
        $crate::Defer::with_action(move || {
            $($body)*;
        })
    };
}
