//! Trellis — a change-tracked, composable list-model framework.
//!
//! Trellis turns "a list of data" into "one UI element per row, kept in
//! sync incrementally". The pieces:
//!
//! - **Source models** ([`VecModel`](model::VecModel),
//!   [`ArrayModel`](model::ArrayModel)): own their rows and originate
//!   change notifications
//! - **Adapter models** ([`FilterModel`](model::FilterModel),
//!   [`MapModel`](model::MapModel), [`SortModel`](model::SortModel),
//!   [`ReverseModel`](model::ReverseModel)): derive their rows from a
//!   source and translate its events into correctly remapped ones
//! - **[`Repeater`]**: consumes any model and drives one instance per row,
//!   creating, updating and destroying instances as the model changes
//!
//! All of it is synchronous and single-threaded: models live on one
//! UI-owning thread, notifications are delivered before the mutating call
//! returns, and the types are `!Send + !Sync` so the compiler enforces the
//! confinement. Background work hands results to the UI thread through
//! whatever event-loop mechanism the host provides before touching a model.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use trellis::model::{Model, SortModel, VecModel};
//!
//! let scores = Rc::new(VecModel::from(vec![3, 1, 2]));
//! let sorted = SortModel::new_ascending(scores.clone());
//!
//! assert_eq!(sorted.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
//!
//! // Mutations flow through with fine-grained events.
//! scores.push(0);
//! assert_eq!(sorted.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
//! ```

pub mod model;
mod repeater;

pub use repeater::{ListViewLayout, RepeatedInstance, Repeater};

pub use trellis_core::{Dependency, EvalScope};
