//! Registry instances and the pool that recycles them
//!
//! A registry is handed out to one scope at a time. When that scope ends the
//! registry is drained and parked here, empty, until the next scope asks for
//! one. The process-wide pool is created on first use and never torn down.

use crate::action::Action;
use crate::registry::Defer;
use deferstack_core::{PoolConfig, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Process-wide pool used by [`Defer::new`] and friends
static GLOBAL_POOL: Lazy<DeferPool> = Lazy::new(DeferPool::new);

/// Source of process-unique registry ids
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// One deferral registry: a LIFO stack of pending actions
pub(crate) struct DeferStack {
    id: u64,
    actions: Vec<Action>,
}

impl DeferStack {
    fn new(capacity: usize) -> Self {
        Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            actions: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Pop and invoke every pending action, newest first.
    ///
    /// Failures are swallowed one action at a time, so every action gets its
    /// turn. Returns the number of actions invoked.
    pub(crate) fn drain(&mut self) -> usize {
        let mut invoked = 0;
        let mut failed = 0;

        while let Some(action) = self.actions.pop() {
            invoked += 1;
            if !action.invoke(self.id) {
                failed += 1;
            }
        }

        if invoked > 0 {
            tracing::debug!(
                instance = self.id,
                invoked,
                failed,
                "Drained deferred actions"
            );
        }
        invoked
    }
}

/// A lock-protected pool of idle, empty registries
pub struct DeferPool {
    idle: Mutex<Vec<DeferStack>>,
    allocated: AtomicUsize,
    config: PoolConfig,
}

impl DeferPool {
    /// Create an unbounded pool with the default configuration
    pub fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            allocated: AtomicUsize::new(0),
            config: PoolConfig::default(),
        }
    }

    /// Create a pool with custom settings
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            idle: Mutex::new(Vec::new()),
            allocated: AtomicUsize::new(0),
            config,
        })
    }

    /// The process-wide pool
    pub fn global() -> &'static DeferPool {
        &GLOBAL_POOL
    }

    /// Begin a deferral scope backed by this pool.
    ///
    /// `None` acquires a registry without registering anything.
    pub fn acquire<F>(&self, action: Option<F>) -> Defer<'_>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut defer = self.scope();
        defer.register_opt(action);
        defer
    }

    /// Begin an empty deferral scope backed by this pool
    pub fn scope(&self) -> Defer<'_> {
        Defer::attach(self.take(), self)
    }

    /// Number of idle registries waiting for reuse
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Number of registries this pool has ever allocated
    pub fn allocated_count(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn take(&self) -> DeferStack {
        let recycled = self.idle.lock().pop();

        match recycled {
            Some(stack) => {
                tracing::trace!(instance = stack.id, "Reusing pooled defer registry");
                stack
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                let stack = DeferStack::new(self.config.stack_capacity);
                tracing::trace!(instance = stack.id, "Allocated new defer registry");
                stack
            }
        }
    }

    /// Park a drained registry for reuse
    pub(crate) fn release(&self, stack: DeferStack) {
        debug_assert_eq!(stack.len(), 0, "released a registry with pending actions");

        let mut idle = self.idle.lock();
        if let Some(max_idle) = self.config.max_idle {
            if idle.len() >= max_idle {
                drop(idle);
                tracing::trace!(instance = stack.id, "Pool full, discarding defer registry");
                return;
            }
        }
        idle.push(stack);
    }
}

impl Default for DeferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferPool")
            .field("idle", &self.idle_count())
            .field("allocated", &self.allocated_count())
            .field("config", &self.config)
            .finish()
    }
}
