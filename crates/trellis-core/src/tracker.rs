//! Dependency tracking for lazily re-evaluated computations.
//!
//! This module provides the two halves of Trellis' reactive wiring:
//!
//! - [`EvalScope`] - owned by a consumer that wants to know when the
//!   values it read have changed (a repeater, a view, a cached layout pass)
//! - [`Dependency`] - owned by a piece of state that can change (a model's
//!   row count, a single row's data)
//!
//! A consumer runs its computation inside [`EvalScope::evaluate`]. Any
//! [`Dependency::register`] call made while that computation runs links the
//! dependency to the scope. When the state later calls
//! [`Dependency::notify`], every linked scope turns dirty and the consumer
//! can re-run the computation at a time of its choosing.
//!
//! Registrations are one-shot: `notify` clears the registration list, and
//! scopes re-register on their next evaluation. Scopes are held weakly, so
//! dropping a consumer never has to unregister anything; stale entries are
//! pruned on the next `notify` pass.
//!
//! Everything here is confined to the thread it was created on. The types
//! are deliberately `!Send + !Sync`; cross-thread reactivity is a host
//! concern, not this crate's.
//!
//! # Example
//!
//! ```
//! use trellis_core::{Dependency, EvalScope};
//!
//! let dep = Dependency::default();
//! let scope = EvalScope::new();
//!
//! let value = scope.evaluate(|| {
//!     dep.register();
//!     42
//! });
//! assert_eq!(value, 42);
//! assert!(!scope.is_dirty());
//!
//! dep.notify();
//! assert!(scope.is_dirty());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

thread_local! {
    /// Stack of scopes currently evaluating on this thread, innermost last.
    static ACTIVE_SCOPES: RefCell<Vec<Weak<ScopeState>>> = const { RefCell::new(Vec::new()) };
}

/// Shared state between an [`EvalScope`] and the dependencies it registered with.
struct ScopeState {
    dirty: Cell<bool>,
}

/// A re-evaluation scope.
///
/// Run a computation with [`evaluate`](Self::evaluate); afterwards,
/// [`is_dirty`](Self::is_dirty) reports whether any dependency read during
/// that computation has been notified since.
pub struct EvalScope {
    state: Rc<ScopeState>,
}

impl Default for EvalScope {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalScope {
    /// Creates a scope. A fresh scope is dirty until it evaluates once.
    pub fn new() -> Self {
        Self { state: Rc::new(ScopeState { dirty: Cell::new(true) }) }
    }

    /// Runs `f` with this scope as the innermost active scope.
    ///
    /// Clears the dirty flag first: the evaluation is, by definition, up to
    /// date with everything it reads. Nesting is allowed; dependencies
    /// register only with the innermost scope.
    pub fn evaluate<R>(&self, f: impl FnOnce() -> R) -> R {
        self.state.dirty.set(false);
        ACTIVE_SCOPES.with(|scopes| scopes.borrow_mut().push(Rc::downgrade(&self.state)));
        let guard = ScopePopGuard;
        let result = f();
        drop(guard);
        result
    }

    /// Returns `true` once any dependency registered during the last
    /// [`evaluate`](Self::evaluate) call has notified.
    pub fn is_dirty(&self) -> bool {
        self.state.dirty.get()
    }
}

/// Pops the innermost scope even if the evaluated closure panics.
struct ScopePopGuard;

impl Drop for ScopePopGuard {
    fn drop(&mut self) {
        ACTIVE_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// A notification endpoint for a piece of changeable state.
///
/// Reads of the state call [`register`](Self::register); writes call
/// [`notify`](Self::notify). The endpoint itself holds no value.
#[derive(Default)]
pub struct Dependency {
    dependents: RefCell<Vec<Weak<ScopeState>>>,
}

impl Dependency {
    /// Links the innermost currently-evaluating scope (if any) to this
    /// dependency. Outside of any [`EvalScope::evaluate`] call this is a
    /// no-op.
    pub fn register(&self) {
        let Some(current) = ACTIVE_SCOPES.with(|scopes| scopes.borrow().last().cloned()) else {
            return;
        };
        let mut dependents = self.dependents.borrow_mut();
        if !dependents.iter().any(|existing| Weak::ptr_eq(existing, &current)) {
            dependents.push(current);
        }
    }

    /// Marks every live registered scope dirty and clears the registration
    /// list. Scopes that re-evaluate will re-register; scopes that were
    /// dropped are discarded here.
    pub fn notify(&self) {
        for dependent in self.dependents.borrow_mut().drain(..) {
            if let Some(state) = dependent.upgrade() {
                state.dirty.set(true);
            }
        }
    }

    /// Returns `true` if at least one live scope is registered.
    pub fn has_dependents(&self) -> bool {
        self.dependents.borrow().iter().any(|dependent| dependent.strong_count() > 0)
    }
}
