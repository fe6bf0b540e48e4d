//! The Trellis model layer.
//!
//! A [`Model`] is a set of rows: a row count plus indexed access, observable
//! through weakly-held peers and through the ambient dependency-tracking
//! scopes of `trellis-core`. Models compose:
//!
//! ```text
//! ┌────────────┐   events   ┌───────────────┐   events   ┌──────────┐
//! │ VecModel   │───────────>│ FilterModel / │───────────>│ Repeater │
//! │ ArrayModel │            │ Map/Sort/     │            │ (one UI  │
//! │ (sources)  │<───reads───│ ReverseModel  │<───reads───│ item per │
//! └────────────┘            └───────────────┘            │   row)   │
//!                                                        └──────────┘
//! ```
//!
//! Data flows one way: a source mutation notifies its peers, adapters patch
//! their index mappings and forward remapped events, and the repeater
//! incrementally updates its instances. Everything is synchronous and
//! confined to the thread the models live on.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use trellis::model::{FilterModel, Model, VecModel};
//!
//! let scores = Rc::new(VecModel::from(vec![10, 9, 8]));
//! let high = FilterModel::new(scores.clone(), |&x| x > 8);
//! assert_eq!(high.iter().collect::<Vec<_>>(), vec![10, 9]);
//!
//! // Rejecting a previously accepted row shrinks the filtered view.
//! scores.set_row_data(0, 5);
//! assert_eq!(high.iter().collect::<Vec<_>>(), vec![9]);
//! ```

mod array_model;
mod filter_model;
mod map_model;
mod notify;
mod reverse_model;
mod sort_model;
mod traits;
mod vec_model;

pub use array_model::ArrayModel;
pub use filter_model::FilterModel;
pub use map_model::MapModel;
pub use notify::{ModelChangeListener, ModelNotify, ModelPeer};
pub use reverse_model::ReverseModel;
pub use sort_model::SortModel;
pub use traits::{Model, ModelExt, ModelIterator, ModelRc, ModelTracker};
pub use vec_model::VecModel;

// Models live on the thread that created them; the compiler enforces it.
static_assertions::assert_not_impl_any!(ModelNotify: Send, Sync);
static_assertions::assert_not_impl_any!(ModelPeer: Send, Sync);
static_assertions::assert_not_impl_any!(VecModel<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(ModelRc<i32>: Send, Sync);
