//! Deferred actions and the failure boundary each one runs inside.

use deferstack_core::ActionFailure;
use std::panic::{self, AssertUnwindSafe};

type Thunk = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// A single zero-argument action waiting on a registry stack
pub(crate) struct Action(Thunk);

impl Action {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Action(Box::new(move || {
            f();
            Ok(())
        }))
    }

    pub(crate) fn fallible<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Into<anyhow::Error>,
    {
        Action(Box::new(move || f().map_err(Into::into)))
    }

    /// Run the action, swallowing whatever it raises.
    ///
    /// Panics and returned errors are both caught here so that one bad action
    /// can never stop the rest of a drain. The failure is logged and dropped;
    /// callers only learn whether the action completed cleanly.
    pub(crate) fn invoke(self, instance: u64) -> bool {
        let failure = match panic::catch_unwind(AssertUnwindSafe(self.0)) {
            Ok(Ok(())) => return true,
            Ok(Err(error)) => ActionFailure::from_error(error),
            Err(payload) => ActionFailure::from_panic(payload),
        };

        tracing::warn!(
            instance,
            panicked = failure.is_panic(),
            "Discarding failure from deferred action: {failure}"
        );
        false
    }
}
