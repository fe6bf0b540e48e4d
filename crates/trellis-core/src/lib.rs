//! Core reactive plumbing for Trellis.
//!
//! This crate provides the foundation the Trellis model layer is built on:
//!
//! - **Dependency tracking**: [`EvalScope`] and [`Dependency`], the ambient
//!   "re-run me when this changes" mechanism that keeps consumers in sync
//!   with the models they read
//! - **Logging**: `tracing` targets and helpers ([`logging`])
//!
//! Everything in this crate is single-threaded by design: Trellis models
//! live on one UI-owning thread, and the types here are `!Send + !Sync` so
//! the compiler enforces that confinement.
//!
//! # Example
//!
//! ```
//! use trellis_core::{Dependency, EvalScope};
//!
//! // A cached computation that reads some changeable state.
//! let row_count_changed = Dependency::default();
//! let scope = EvalScope::new();
//!
//! let count = scope.evaluate(|| {
//!     row_count_changed.register();
//!     3usize
//! });
//! assert_eq!(count, 3);
//!
//! // The state changes; the scope knows it must re-run.
//! row_count_changed.notify();
//! assert!(scope.is_dirty());
//! ```

pub mod logging;
mod tracker;

pub use logging::PerfSpan;
pub use tracker::{Dependency, EvalScope};

// The reactive wiring is confined to the thread that created it.
static_assertions::assert_not_impl_any!(EvalScope: Send, Sync);
static_assertions::assert_not_impl_any!(Dependency: Send, Sync);
