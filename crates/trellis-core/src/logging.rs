//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for all diagnostics. The library never
//! installs a subscriber itself; hosts that want to see the output install
//! one (typically `tracing-subscriber` with an `EnvFilter`, so `RUST_LOG`
//! controls verbosity):
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
//!     .init();
//! ```
//!
//! The [`targets`] module lists the target strings Trellis emits under, for
//! use in filter directives (e.g. `RUST_LOG=trellis::model=trace`).

/// Target names for log filtering.
pub mod targets {
    /// Core reactive plumbing (scopes, dependencies).
    pub const CORE: &str = "trellis_core";
    /// Model layer: source models and notification fan-out.
    pub const MODEL: &str = "trellis::model";
    /// Adapter models (filter/map/sort/reverse).
    pub const ADAPTER: &str = "trellis::model::adapter";
    /// Repeater instance management.
    pub const REPEATER: &str = "trellis::repeater";
}

/// A guard that keeps a `perf` tracing span entered until dropped.
///
/// Useful for timing an update pass:
///
/// ```
/// use trellis_core::logging::PerfSpan;
///
/// let _span = PerfSpan::new("ensure_updated");
/// // ... the work being measured ...
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Creates a performance span that stays active until the guard drops.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self { span: span.entered() }
    }
}

/// Emits a `trace` event under the `trellis::model` target.
#[macro_export]
macro_rules! trellis_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "trellis::model", $($arg)*)
    };
}

/// Emits a `warn` event under the `trellis::model` target.
#[macro_export]
macro_rules! trellis_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "trellis::model", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perf_span_enters_and_drops() {
        tracing_subscriber::fmt().with_test_writer().try_init().ok();
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn macros_emit_without_subscriber() {
        trellis_trace!("trace event {}", 1);
        trellis_warn!(row = 3, "warn event");
    }
}
