//! Scope-bound deferral handles
//!
//! [`Defer`] owns one registry for the lifetime of a scope. Actions pushed onto
//! it run newest-first when the handle is dropped, on every exit path
//! including panic unwinding. [`EarlyDrain`] is the nested form: dropping it
//! flushes everything pending on the owning handle before the outer scope
//! ends.

use crate::action::Action;
use crate::pool::{DeferPool, DeferStack};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Begin a deferral scope on the global pool with `action` as its first entry
pub fn defer<F>(action: F) -> Defer<'static>
where
    F: FnOnce() + Send + 'static,
{
    Defer::with_action(action)
}

/// A deferral scope holding a LIFO stack of actions.
///
/// Failures raised by actions during a drain are logged and discarded. Only
/// the owning handle ever returns its registry to the pool, and it does so
/// exactly once, from `Drop`.
#[must_use = "dropping a Defer immediately runs its actions"]
pub struct Defer<'p> {
    stack: Option<DeferStack>,
    pool: &'p DeferPool,
}

impl Defer<'static> {
    /// Acquire an empty registry from the global pool
    pub fn new() -> Self {
        DeferPool::global().scope()
    }

    /// Acquire a registry from the global pool, registering `action` if present
    pub fn acquire<F>(action: Option<F>) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        DeferPool::global().acquire(action)
    }

    /// Acquire a registry from the global pool with `action` as its first entry
    pub fn with_action<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        DeferPool::global().acquire(Some(action))
    }
}

impl Default for Defer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> Defer<'p> {
    pub(crate) fn attach(stack: DeferStack, pool: &'p DeferPool) -> Self {
        Self {
            stack: Some(stack),
            pool,
        }
    }

    fn push(&mut self, action: Action) -> &mut Self {
        if let Some(stack) = self.stack.as_mut() {
            stack.push(action);
        }
        self
    }

    /// Push `action` onto the top of the stack
    pub fn register<F>(&mut self, action: F) -> &mut Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Action::new(action))
    }

    /// Push `action` if present; `None` is ignored
    pub fn register_opt<F>(&mut self, action: Option<F>) -> &mut Self
    where
        F: FnOnce() + Send + 'static,
    {
        match action {
            Some(action) => self.register(action),
            None => self,
        }
    }

    /// Push a fallible action. An `Err` is treated like a panic: logged and
    /// discarded during the drain.
    pub fn try_register<F, E>(&mut self, action: F) -> &mut Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Into<anyhow::Error>,
    {
        self.push(Action::fallible(action))
    }

    /// Push `action` and return a nested handle that drains this registry
    /// when it goes out of scope.
    ///
    /// ```
    /// use deferstack::Defer;
    ///
    /// let mut outer = Defer::new();
    /// outer.register(|| println!("2"));
    /// {
    ///     let _inner = outer.scoped(|| println!("1"));
    /// } // prints 1 then 2
    /// outer.register(|| println!("3"));
    /// // prints 3 when `outer` is dropped
    /// ```
    pub fn scoped<F>(&mut self, action: F) -> EarlyDrain<'_, 'p>
    where
        F: FnOnce() + Send + 'static,
    {
        self.register(action);
        EarlyDrain { defer: self }
    }

    /// Like [`Defer::scoped`], ignoring `None`
    pub fn scoped_opt<F>(&mut self, action: Option<F>) -> EarlyDrain<'_, 'p>
    where
        F: FnOnce() + Send + 'static,
    {
        self.register_opt(action);
        EarlyDrain { defer: self }
    }

    /// Run every pending action now, newest first, keeping the handle usable.
    ///
    /// Flushing never hands the registry back to the pool; that only happens
    /// when the owning handle is dropped.
    pub fn flush(&mut self) {
        if let Some(stack) = self.stack.as_mut() {
            stack.drain();
        }
    }

    /// Number of pending actions
    pub fn len(&self) -> usize {
        self.stack.as_ref().map_or(0, DeferStack::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Process-unique id of the registry backing this handle
    pub fn instance_id(&self) -> u64 {
        self.stack.as_ref().map_or(0, DeferStack::id)
    }
}

impl Drop for Defer<'_> {
    fn drop(&mut self) {
        // Taking the stack out is the guard against returning it twice.
        if let Some(mut stack) = self.stack.take() {
            stack.drain();
            self.pool.release(stack);
        }
    }
}

impl fmt::Debug for Defer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Defer")
            .field("instance", &self.instance_id())
            .field("pending", &self.len())
            .finish()
    }
}

/// Nested handle returned by [`Defer::scoped`].
///
/// Dereferences to the owning [`Defer`], so further actions can be registered
/// through it. Dropping it flushes the owner.
#[must_use = "dropping an EarlyDrain immediately flushes its registry"]
pub struct EarlyDrain<'a, 'p> {
    defer: &'a mut Defer<'p>,
}

impl<'p> Deref for EarlyDrain<'_, 'p> {
    type Target = Defer<'p>;

    fn deref(&self) -> &Self::Target {
        &*self.defer
    }
}

impl DerefMut for EarlyDrain<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.defer
    }
}

impl Drop for EarlyDrain<'_, '_> {
    fn drop(&mut self) {
        self.defer.flush();
    }
}

impl fmt::Debug for EarlyDrain<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EarlyDrain").field(&*self.defer).finish()
    }
}
