//! Core errors and configuration types for `deferstack`.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum and `Result` alias for fallible setup, and
//!   `ActionFailure`, which describes a deferred action that failed while its
//!   registry drained.
//! - **`config`**: `PoolConfig`, the tunables for a pool of idle registries.

pub mod config;
pub mod errors;

pub use self::{
    config::PoolConfig,
    errors::{ActionFailure, Error, Result},
};
