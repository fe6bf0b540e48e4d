//! The core model contract: [`Model`], its tracker hooks, the [`ModelExt`]
//! combinators, and the type-erased [`ModelRc`] handle.

use std::rc::Rc;

use super::notify::ModelPeer;
use super::{FilterModel, MapModel, ReverseModel, SortModel};

/// Hooks a consumer uses to stay synchronized with a model.
///
/// Implementations usually return a reference to the model's
/// [`ModelNotify`](super::ModelNotify) field. Constant models can return
/// `&()`, which implements this trait as a set of no-ops.
pub trait ModelTracker {
    /// Attach one peer. The peer will be notified when the model changes.
    fn attach_peer(&self, peer: ModelPeer);
    /// Registers the model's row count with the innermost evaluation scope,
    /// so the scope turns dirty when the count changes.
    fn track_row_count_changes(&self);
    /// Registers one row's data with the innermost evaluation scope, so the
    /// scope turns dirty when that row changes.
    fn track_row_data_changes(&self, row: usize);
}

impl ModelTracker for () {
    fn attach_peer(&self, _peer: ModelPeer) {}
    fn track_row_count_changes(&self) {}
    fn track_row_data_changes(&self, _row: usize) {}
}

/// A set of rows, observable and optionally writable.
///
/// This is the abstraction consumed by the [`Repeater`](crate::Repeater)
/// and produced by the source models ([`VecModel`](super::VecModel),
/// [`ArrayModel`](super::ArrayModel)) and adapters.
///
/// Mutable implementations hold a [`ModelNotify`](super::ModelNotify) and
/// call the matching notification immediately after altering their backing
/// storage.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use trellis::model::{Model, ModelNotify, ModelTracker};
///
/// pub struct Squares {
///     upto: RefCell<usize>,
///     notify: ModelNotify,
/// }
///
/// impl Model for Squares {
///     type Data = usize;
///
///     fn row_count(&self) -> usize {
///         *self.upto.borrow()
///     }
///
///     fn row_data(&self, row: usize) -> Option<usize> {
///         (row < self.row_count()).then(|| row * row)
///     }
///
///     fn model_tracker(&self) -> &dyn ModelTracker {
///         &self.notify
///     }
/// }
///
/// let squares = Squares { upto: RefCell::new(4), notify: ModelNotify::default() };
/// assert_eq!(squares.row_data(3), Some(9));
/// assert_eq!(squares.row_data(4), None);
/// ```
pub trait Model {
    /// The data of one row.
    type Data;

    /// The number of rows in the model.
    fn row_count(&self) -> usize;

    /// Returns the data at `row`, or `None` if `row >= row_count()`.
    ///
    /// This does not register a dependency with the ambient evaluation
    /// scope; use [`ModelExt::row_data_tracked`] for that.
    fn row_data(&self, row: usize) -> Option<Self::Data>;

    /// Attempts to write the data at `row`.
    ///
    /// Models that cannot support mutation leave this default in place: it
    /// logs a warning naming the concrete type and does nothing. Mutation
    /// through a UI binding is routinely attempted against read-only
    /// models, so this degrades softly instead of failing.
    ///
    /// Writable implementations must call
    /// [`ModelNotify::row_changed`](super::ModelNotify::row_changed) after
    /// storing the value.
    fn set_row_data(&self, _row: usize, _data: Self::Data) {
        trellis_core::trellis_warn!(
            "set_row_data called on the read-only model type {}; ignoring the write",
            std::any::type_name::<Self>(),
        );
    }

    /// Returns the tracker consumers use to observe this model.
    fn model_tracker(&self) -> &dyn ModelTracker;

    /// Returns an iterator visiting all rows of the model.
    fn iter(&self) -> ModelIterator<'_, Self::Data>
    where
        Self: Sized,
    {
        ModelIterator::new(self)
    }

    /// Returns something that can be downcast (typically `self`).
    ///
    /// Lets a concrete model be recovered from a [`ModelRc`]:
    ///
    /// ```
    /// use trellis::model::{Model, ModelRc, VecModel};
    ///
    /// let handle = ModelRc::new(VecModel::from(vec![1i32, 2, 3]));
    /// handle.as_any().downcast_ref::<VecModel<i32>>().unwrap().push(4);
    /// assert_eq!(handle.row_data(3), Some(4));
    /// ```
    fn as_any(&self) -> &dyn std::any::Any {
        &()
    }
}

/// Extra methods on every [`Model`].
pub trait ModelExt: Model {
    /// Registers `row` with the ambient evaluation scope, then reads it.
    fn row_data_tracked(&self, row: usize) -> Option<Self::Data> {
        self.model_tracker().track_row_data_changes(row);
        self.row_data(row)
    }

    /// Returns a model with every row mapped through `map_function`.
    /// Shortcut for [`MapModel::new`].
    fn map<F, U>(self, map_function: F) -> MapModel<Self, F>
    where
        Self: Sized + 'static,
        F: Fn(Self::Data) -> U + 'static,
    {
        MapModel::new(self, map_function)
    }

    /// Returns a model with the rows for which `filter_function` holds.
    /// Shortcut for [`FilterModel::new`].
    fn filter<F>(self, filter_function: F) -> FilterModel<Self, F>
    where
        Self: Sized + 'static,
        F: Fn(&Self::Data) -> bool + 'static,
    {
        FilterModel::new(self, filter_function)
    }

    /// Returns a model with the rows sorted ascending.
    /// Shortcut for [`SortModel::new_ascending`].
    #[must_use]
    fn sort(self) -> SortModel<Self>
    where
        Self: Sized + 'static,
        Self::Data: Ord,
    {
        SortModel::new_ascending(self)
    }

    /// Returns a model with the rows ordered by `sort_function`.
    /// Shortcut for [`SortModel::new`].
    fn sort_by<F>(self, sort_function: F) -> SortModel<Self>
    where
        Self: Sized + 'static,
        F: FnMut(&Self::Data, &Self::Data) -> std::cmp::Ordering + 'static,
    {
        SortModel::new(self, sort_function)
    }

    /// Returns a model with the rows in reverse order.
    /// Shortcut for [`ReverseModel::new`].
    #[must_use]
    fn reverse(self) -> ReverseModel<Self>
    where
        Self: Sized + 'static,
    {
        ReverseModel::new(self)
    }
}

impl<M: Model> ModelExt for M {}

/// An iterator over the rows of a model, created by [`Model::iter`].
pub struct ModelIterator<'a, T> {
    model: &'a dyn Model<Data = T>,
    row: usize,
}

impl<'a, T> ModelIterator<'a, T> {
    /// Creates an iterator starting at row 0.
    pub fn new(model: &'a dyn Model<Data = T>) -> Self {
        Self { model, row: 0 }
    }
}

impl<T> Iterator for ModelIterator<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.row;
        if self.row < self.model.row_count() {
            self.row += 1;
        }
        self.model.row_data(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.model.row_count().saturating_sub(self.row);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for ModelIterator<'_, T> {}

impl<M: Model> Model for Rc<M> {
    type Data = M::Data;

    fn row_count(&self) -> usize {
        (**self).row_count()
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        (**self).row_data(row)
    }

    fn set_row_data(&self, row: usize, data: Self::Data) {
        (**self).set_row_data(row, data)
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        (**self).model_tracker()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        (**self).as_any()
    }
}

/// A constant model of `row_count` rows whose data is the row index.
impl Model for usize {
    type Data = i32;

    fn row_count(&self) -> usize {
        *self
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        (row < *self).then_some(row as i32)
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A constant model with one `()` row when `true`, none when `false`.
impl Model for bool {
    type Data = ();

    fn row_count(&self) -> usize {
        usize::from(*self)
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        (row < self.row_count()).then_some(())
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A reference-counted, type-erased [`Model`] handle.
///
/// This is the value type that flows through model bindings: a repeater's
/// model property holds a `ModelRc`, and swapping in a different handle is
/// what "the model changed" means. Equality is pointer identity, not row
/// contents.
///
/// [`ModelRc::default`] is an empty handle with zero rows.
pub struct ModelRc<T>(Option<Rc<dyn Model<Data = T>>>);

impl<T> std::fmt::Debug for ModelRc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModelRc(dyn Model)")
    }
}

impl<T> Clone for ModelRc<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Default for ModelRc<T> {
    /// Constructs an empty handle.
    fn default() -> Self {
        Self(None)
    }
}

impl<T> PartialEq for ModelRc<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

impl<T> ModelRc<T> {
    /// Wraps a model in a new handle.
    pub fn new(model: impl Model<Data = T> + 'static) -> Self {
        Self(Some(Rc::new(model)))
    }
}

impl<T, M: Model<Data = T> + 'static> From<Rc<M>> for ModelRc<T> {
    fn from(model: Rc<M>) -> Self {
        Self(Some(model))
    }
}

impl<T> From<Rc<dyn Model<Data = T> + 'static>> for ModelRc<T> {
    fn from(model: Rc<dyn Model<Data = T> + 'static>) -> Self {
        Self(Some(model))
    }
}

impl<T> Model for ModelRc<T> {
    type Data = T;

    fn row_count(&self) -> usize {
        self.0.as_ref().map_or(0, |model| model.row_count())
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        self.0.as_ref().and_then(|model| model.row_data(row))
    }

    fn set_row_data(&self, row: usize, data: Self::Data) {
        if let Some(model) = self.0.as_ref() {
            model.set_row_data(row, data);
        }
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        self.0.as_ref().map_or(&(), |model| model.model_tracker())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self.0.as_ref().map_or(&(), |model| model.as_any())
    }
}

#[cfg(test)]
mod tests {
    use super::super::VecModel;
    use super::*;

    #[test]
    fn row_data_absent_iff_out_of_range() {
        let model = VecModel::from(vec![10, 20, 30]);
        for row in 0..model.row_count() {
            assert!(model.row_data(row).is_some());
        }
        assert_eq!(model.row_data(3), None);
        assert_eq!(model.row_data(usize::MAX), None);
    }

    #[test]
    fn read_only_write_is_a_logged_no_op() {
        tracing_subscriber::fmt().with_test_writer().try_init().ok();
        // `usize` models are constant; the write must not panic or change anything.
        let model = 5usize;
        model.set_row_data(2, 42);
        assert_eq!(model.row_data(2), Some(2));
    }

    #[test]
    fn iterator_visits_every_row_once() {
        let model = VecModel::from(vec![1, 2, 3]);
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(model.iter().len(), 3);
        assert_eq!(model.iter().skip(2).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn constant_models() {
        assert_eq!(3usize.row_count(), 3);
        assert_eq!(3usize.row_data(1), Some(1));
        assert_eq!(3usize.row_data(3), None);

        assert_eq!(true.row_count(), 1);
        assert_eq!(true.row_data(0), Some(()));
        assert_eq!(false.row_count(), 0);
        assert_eq!(false.row_data(0), None);
    }

    #[test]
    fn tracked_read_registers_the_row_dependency() {
        let model = VecModel::from(vec![1u8, 2, 3]);
        let scope = trellis_core::EvalScope::new();

        assert_eq!(scope.evaluate(|| model.row_data_tracked(1)), Some(2));
        assert!(!scope.is_dirty());

        // Another row changing leaves the scope alone.
        model.set_row_data(2, 42);
        assert!(!scope.is_dirty());
        model.set_row_data(1, 100);
        assert!(scope.is_dirty());

        assert_eq!(scope.evaluate(|| model.row_data_tracked(1)), Some(100));
        assert!(!scope.is_dirty());

        // Structural changes shift row meanings, so tracked rows go dirty too.
        model.push(200);
        assert!(scope.is_dirty());
    }

    #[test]
    fn model_rc_identity_equality() {
        let a = ModelRc::new(VecModel::from(vec![1]));
        let b = a.clone();
        let c = ModelRc::new(VecModel::from(vec![1]));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(ModelRc::<i32>::default(), ModelRc::<i32>::default());
        assert_ne!(a, ModelRc::default());
    }

    #[test]
    fn empty_model_rc_has_no_rows() {
        let handle = ModelRc::<String>::default();
        assert_eq!(handle.row_count(), 0);
        assert_eq!(handle.row_data(0), None);
    }

    #[test]
    fn model_rc_downcast() {
        let handle = ModelRc::new(VecModel::from(vec![1i32, 2, 3]));
        handle.as_any().downcast_ref::<VecModel<i32>>().unwrap().push(4);
        assert_eq!(handle.row_count(), 4);
        assert_eq!(handle.row_data(3), Some(4));
    }

    #[test]
    fn shared_model_through_rc() {
        let shared = Rc::new(VecModel::from(vec![1, 2]));
        let as_model: &dyn Model<Data = i32> = &shared;
        assert_eq!(as_model.row_count(), 2);
        shared.push(3);
        assert_eq!(as_model.row_count(), 3);
    }
}
