//! A comparator adapter exposing the rows of a source model in sorted order.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::rc::Rc;

use super::notify::{ModelChangeListener, ModelNotify, ModelPeer};
use super::traits::{Model, ModelTracker};

trait SortHelper<D> {
    fn compare(&self, lhs: &D, rhs: &D) -> Ordering;
}

/// Sorts `Ord` rows ascending.
struct AscendingSortHelper;

impl<D: Ord> SortHelper<D> for AscendingSortHelper {
    fn compare(&self, lhs: &D, rhs: &D) -> Ordering {
        lhs.cmp(rhs)
    }
}

struct FnSortHelper<F, D>
where
    F: FnMut(&D, &D) -> Ordering + 'static,
{
    sort_function: RefCell<F>,
    _data: PhantomData<D>,
}

impl<F, D> SortHelper<D> for FnSortHelper<F, D>
where
    F: FnMut(&D, &D) -> Ordering + 'static,
{
    fn compare(&self, lhs: &D, rhs: &D) -> Ordering {
        (self.sort_function.borrow_mut())(lhs, rhs)
    }
}

struct SortModelInner<M>
where
    M: Model + 'static,
{
    wrapped: M,
    sort_helper: Box<dyn SortHelper<M::Data>>,
    /// Permutation: sorted position -> source index.
    mapping: RefCell<Vec<usize>>,
    /// Set when the permutation is stale; the next read rebuilds it with a
    /// full stable sort.
    dirty: Cell<bool>,
    notify: ModelNotify,
}

impl<M> SortModelInner<M>
where
    M: Model + 'static,
{
    fn compare_rows_data(&self, lhs: &M::Data, rhs: &M::Data) -> Ordering {
        self.sort_helper.compare(lhs, rhs)
    }

    fn compare_source_rows(&self, lhs: usize, rhs: usize) -> Ordering {
        match (self.wrapped.row_data(lhs), self.wrapped.row_data(rhs)) {
            (Some(a), Some(b)) => self.compare_rows_data(&a, &b),
            _ => Ordering::Equal,
        }
    }

    fn ensure_mapping(&self) {
        if !self.dirty.get() {
            return;
        }
        let mut mapping = self.mapping.borrow_mut();
        mapping.clear();
        mapping.extend(0..self.wrapped.row_count());
        mapping.sort_by(|&lhs, &rhs| self.compare_source_rows(lhs, rhs));
        self.dirty.set(false);
    }

    /// Where `data` belongs among the currently mapped rows: before the
    /// first mapped row that does not compare less than it.
    fn insertion_point(&self, mapping: &[usize], data: &M::Data) -> usize {
        mapping.partition_point(|&existing| {
            self.wrapped
                .row_data(existing)
                .is_some_and(|existing_data| {
                    self.compare_rows_data(&existing_data, data) == Ordering::Less
                })
        })
    }

    fn invalidate(&self) {
        self.dirty.set(true);
        self.notify.reset();
    }
}

impl<M> ModelChangeListener for SortModelInner<M>
where
    M: Model + 'static,
{
    fn row_changed(&self, row: usize) {
        if self.dirty.get() {
            self.invalidate();
            return;
        }

        let Some(changed_data) = self.wrapped.row_data(row) else {
            return;
        };

        let mut mapping = self.mapping.borrow_mut();
        let Some(removed_index) = mapping.iter().position(|&source| source == row) else {
            return;
        };
        mapping.remove(removed_index);

        // The comparator key may have moved; find the row's new home.
        let insertion_index = self.insertion_point(&mapping, &changed_data);
        mapping.insert(insertion_index, row);
        drop(mapping);

        if insertion_index == removed_index {
            self.notify.row_changed(removed_index);
        } else {
            self.notify.row_removed(removed_index, 1);
            self.notify.row_added(insertion_index, 1);
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

        // The source indices shifted; realign the permutation first.
        for source in self.mapping.borrow_mut().iter_mut() {
            if *source >= index {
                *source += count;
            }
        }

        // Insertion points can differ per row, so each added row gets its
        // own event.
        for row in index..index + count {
            let Some(added_data) = self.wrapped.row_data(row) else {
                continue;
            };
            let insertion_index = {
                let mut mapping = self.mapping.borrow_mut();
                let insertion_index = self.insertion_point(&mapping, &added_data);
                mapping.insert(insertion_index, row);
                insertion_index
            };
            self.notify.row_added(insertion_index, 1);
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

        // Positions are recorded as each entry is erased, so every event
        // carries the sorted position the entry held at that moment.
        let mut removed_positions = Vec::new();
        {
            let mut mapping = self.mapping.borrow_mut();
            let mut i = 0;
            while i < mapping.len() {
                let source = mapping[i];
                if source >= index {
                    if source < index + count {
                        removed_positions.push(i);
                        mapping.remove(i);
                        continue;
                    }
                    mapping[i] = source - count;
                }
                i += 1;
            }
        }
        for position in removed_positions {
            self.notify.row_removed(position, 1);
        }
    }

    fn reset(&self) {
        self.invalidate();
    }
}

/// Provides a sorted view of the rows of another [`Model`].
///
/// The permutation is rebuilt lazily with a stable sort and patched
/// incrementally while the source emits fine-grained events.
///
/// ```
/// use trellis::model::{Model, SortModel, VecModel};
///
/// let sorted = SortModel::new_ascending(VecModel::from(vec![5, 1, 3]));
/// assert_eq!(sorted.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
/// ```
pub struct SortModel<M>(Rc<SortModelInner<M>>)
where
    M: Model + 'static;

impl<M> SortModel<M>
where
    M: Model + 'static,
{
    /// Creates a `SortModel` ordering the rows of `wrapped` by
    /// `sort_function`.
    /// Alternatively use [`ModelExt::sort_by`](super::ModelExt::sort_by).
    pub fn new<F>(wrapped: M, sort_function: F) -> Self
    where
        F: FnMut(&M::Data, &M::Data) -> Ordering + 'static,
    {
        Self::with_helper(
            wrapped,
            Box::new(FnSortHelper { sort_function: RefCell::new(sort_function), _data: PhantomData }),
        )
    }

    /// Creates a `SortModel` ordering the rows of `wrapped` ascending.
    /// Alternatively use [`ModelExt::sort`](super::ModelExt::sort).
    pub fn new_ascending(wrapped: M) -> Self
    where
        M::Data: Ord,
    {
        Self::with_helper(wrapped, Box::new(AscendingSortHelper))
    }

    fn with_helper(wrapped: M, sort_helper: Box<dyn SortHelper<M::Data>>) -> Self {
        let inner = Rc::new(SortModelInner {
            wrapped,
            sort_helper,
            mapping: RefCell::new(Vec::new()),
            dirty: Cell::new(true),
            notify: ModelNotify::default(),
        });
        inner.wrapped.model_tracker().attach_peer(ModelPeer::new(&inner));
        Self(inner)
    }

    /// Re-applies the comparator over all source rows.
    ///
    /// Needed when the comparator closes over external state and that
    /// state changed; always emits a reset downstream.
    pub fn reset(&self) {
        self.0.invalidate();
    }

    /// Returns the source-model index of the given sorted row.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_row >= row_count()`.
    pub fn unsorted_row(&self, sorted_row: usize) -> usize {
        self.0.ensure_mapping();
        self.0.mapping.borrow()[sorted_row]
    }
}

impl<M> Model for SortModel<M>
where
    M: Model + 'static,
{
    type Data = M::Data;

    fn row_count(&self) -> usize {
        // Sorting preserves cardinality; no need to touch the permutation.
        self.0.wrapped.row_count()
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
