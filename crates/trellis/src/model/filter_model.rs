//! A predicate adapter exposing the subset of a source model's rows.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::notify::{ModelChangeListener, ModelNotify, ModelPeer};
use super::traits::{Model, ModelTracker};

struct FilterModelInner<M, F>
where
    M: Model + 'static,
    F: Fn(&M::Data) -> bool + 'static,
{
    wrapped: M,
    filter_function: F,
    /// Source indices of the accepted rows, ascending.
    mapping: RefCell<Vec<usize>>,
    /// Set when the mapping no longer reflects the source; cleared by
    /// `ensure_mapping`.
    dirty: Cell<bool>,
    notify: ModelNotify,
}

impl<M, F> FilterModelInner<M, F>
where
    M: Model + 'static,
    F: Fn(&M::Data) -> bool + 'static,
{
    fn accepts(&self, row: usize) -> bool {
        self.wrapped.row_data(row).is_some_and(|data| (self.filter_function)(&data))
    }

    fn ensure_mapping(&self) {
        if !self.dirty.get() {
            return;
        }
        *self.mapping.borrow_mut() = self
            .wrapped
            .iter()
            .enumerate()
            .filter_map(|(row, data)| (self.filter_function)(&data).then_some(row))
            .collect();
        self.dirty.set(false);
    }

    /// Re-evaluates the predicate over all source rows and tells the
    /// observers to re-pull everything.
    fn invalidate(&self) {
        self.dirty.set(true);
        self.ensure_mapping();
        self.notify.reset();
    }
}

impl<M, F> ModelChangeListener for FilterModelInner<M, F>
where
    M: Model + 'static,
    F: Fn(&M::Data) -> bool + 'static,
{
    fn row_changed(&self, row: usize) {
        if self.dirty.get() {
            self.invalidate();
            return;
        }

        let accepted_now = self.accepts(row);
        let mut mapping = self.mapping.borrow_mut();
        let (position, was_accepted) = match mapping.binary_search(&row) {
            Ok(position) => (position, true),
            Err(position) => (position, false),
        };

        match (was_accepted, accepted_now) {
            (true, true) => {
                drop(mapping);
                self.notify.row_changed(position);
            }
            (false, true) => {
                mapping.insert(position, row);
                drop(mapping);
                self.notify.row_added(position, 1);
            }
            (true, false) => {
                mapping.remove(position);
                drop(mapping);
                self.notify.row_removed(position, 1);
            }
            (false, false) => {}
        }
    }

    fn row_added(&self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        if self.dirty.get() {
            self.invalidate();
            return;
        }

        // The source storage is already updated, so the inserted rows can
        // be read directly at their final indices.
        let accepted: Vec<usize> = (index..index + count).filter(|&row| self.accepts(row)).collect();

        let mut mapping = self.mapping.borrow_mut();
        let insertion_point = mapping.partition_point(|&source| source < index);
        for source in &mut mapping[insertion_point..] {
            *source += count;
        }
        let inserted = accepted.len();
        mapping.splice(insertion_point..insertion_point, accepted);
        drop(mapping);

        if inserted > 0 {
            // Contiguous in the filtered space because the accepted rows
            // were contiguous in the source and inserted together.
            self.notify.row_added(insertion_point, inserted);
        }
    }

    fn row_removed(&self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        if self.dirty.get() {
            self.invalidate();
            return;
        }

        let mut mapping = self.mapping.borrow_mut();
        let start = mapping.partition_point(|&source| source < index);
        let end = mapping.partition_point(|&source| source < index + count);
        let removed = end - start;
        mapping.drain(start..end);
        for source in &mut mapping[start..] {
            *source -= count;
        }
        drop(mapping);

        if removed > 0 {
            self.notify.row_removed(start, removed);
        }
    }

    fn reset(&self) {
        self.invalidate();
    }
}

/// Provides a filtered subset of the rows of another [`Model`].
///
/// When the source model changes, the `FilterModel` re-evaluates the
/// predicate where needed and forwards correctly remapped events to its
/// own observers.
///
/// ```
/// use trellis::model::{FilterModel, Model, VecModel};
///
/// let filtered = FilterModel::new(VecModel::from(vec![1, 2, 3, 4, 5, 6]), |x| x % 2 == 0);
/// assert_eq!(filtered.iter().collect::<Vec<_>>(), vec![2, 4, 6]);
/// ```
pub struct FilterModel<M, F>(Rc<FilterModelInner<M, F>>)
where
    M: Model + 'static,
    F: Fn(&M::Data) -> bool + 'static;

impl<M, F> FilterModel<M, F>
where
    M: Model + 'static,
    F: Fn(&M::Data) -> bool + 'static,
{
    /// Creates a `FilterModel` exposing the rows of `wrapped` for which
    /// `filter_function` returns `true`.
    /// Alternatively use [`ModelExt::filter`](super::ModelExt::filter).
    pub fn new(wrapped: M, filter_function: F) -> Self {
        let inner = Rc::new(FilterModelInner {
            wrapped,
            filter_function,
            mapping: RefCell::new(Vec::new()),
            dirty: Cell::new(true),
            notify: ModelNotify::default(),
        });
        inner.wrapped.model_tracker().attach_peer(ModelPeer::new(&inner));
        Self(inner)
    }

    /// Re-applies the predicate over all source rows.
    ///
    /// Needed when the predicate closes over external state and that state
    /// changed; always emits a reset downstream.
    pub fn reset(&self) {
        self.0.invalidate();
    }

    /// Returns the source-model index of the given filtered row.
    ///
    /// # Panics
    ///
    /// Panics if `filtered_row >= row_count()`.
    pub fn unfiltered_row(&self, filtered_row: usize) -> usize {
        self.0.ensure_mapping();
        self.0.mapping.borrow()[filtered_row]
    }
}

impl<M, F> Model for FilterModel<M, F>
where
    M: Model + 'static,
    F: Fn(&M::Data) -> bool + 'static,
{
    type Data = M::Data;

    fn row_count(&self) -> usize {
        self.0.ensure_mapping();
        self.0.mapping.borrow().len()
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        self.0.ensure_mapping();
        let source_row = self.0.mapping.borrow().get(row).copied()?;
        self.0.wrapped.row_data(source_row)
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &self.0.notify
    }
}
