//! A transform adapter changing the element type of a source model.

use std::rc::Rc;

use super::notify::{ModelChangeListener, ModelNotify, ModelPeer};
use super::traits::{Model, ModelTracker};

struct MapModelInner<M, F> {
    wrapped: M,
    map_function: F,
    notify: ModelNotify,
}

/// Row identity is preserved 1:1, so every event forwards verbatim with no
/// index arithmetic.
impl<M, F> ModelChangeListener for MapModelInner<M, F> {
    fn row_changed(&self, row: usize) {
        self.notify.row_changed(row);
    }

    fn row_added(&self, index: usize, count: usize) {
        self.notify.row_added(index, count);
    }

    fn row_removed(&self, index: usize, count: usize) {
        self.notify.row_removed(index, count);
    }

    fn reset(&self) {
        self.notify.reset();
    }
}

/// Provides rows generated by applying a function to the rows of another
/// [`Model`].
///
/// The transform runs on every read and its result is never cached, so it
/// should be cheap and side-effect free.
///
/// ```
/// use trellis::model::{MapModel, Model, VecModel};
///
/// let lengths = MapModel::new(VecModel::from(vec!["a", "bb", "ccc"]), |s: &str| s.len());
/// assert_eq!(lengths.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub struct MapModel<M, F>(Rc<MapModelInner<M, F>>);

impl<M, F, T, U> MapModel<M, F>
where
    M: Model<Data = T> + 'static,
    F: Fn(T) -> U + 'static,
{
    /// Creates a `MapModel` applying `map_function` to every row of
    /// `wrapped`. Alternatively use [`ModelExt::map`](super::ModelExt::map).
    pub fn new(wrapped: M, map_function: F) -> Self {
        let inner = Rc::new(MapModelInner { wrapped, map_function, notify: ModelNotify::default() });
        inner.wrapped.model_tracker().attach_peer(ModelPeer::new(&inner));
        Self(inner)
    }

    /// Tells the observers to re-pull every row.
    ///
    /// Needed when the transform closes over external state and that state
    /// changed.
    pub fn reset(&self) {
        self.0.notify.reset();
    }
}

impl<M, F, T, U> Model for MapModel<M, F>
where
    M: Model<Data = T> + 'static,
    F: Fn(T) -> U + 'static,
{
    type Data = U;

    fn row_count(&self) -> usize {
        self.0.wrapped.row_count()
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        self.0.wrapped.row_data(row).map(|data| (self.0.map_function)(data))
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &self.0.notify
    }
}
