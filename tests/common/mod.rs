//! Common test utilities and helpers
//!
//! Shared by the integration tests: an order recorder for deferred actions and
//! a one-time tracing subscriber so swallowed failures show up with
//! `RUST_LOG=deferstack=debug`.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test writer subscriber, once per test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn"))
            .unwrap();

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Records the order in which deferred actions run
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<u32>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that appends `n` when invoked
    pub fn action(&self, n: u32) -> impl FnOnce() + Send + 'static {
        let recorder = self.clone();
        move || recorder.0.lock().push(n)
    }

    /// An action that appends `n` and then panics
    pub fn panicking(&self, n: u32) -> impl FnOnce() + Send + 'static {
        let recorder = self.clone();
        move || {
            recorder.0.lock().push(n);
            panic!("deferred action {n} failed");
        }
    }

    pub fn seen(&self) -> Vec<u32> {
        self.0.lock().clone()
    }
}
