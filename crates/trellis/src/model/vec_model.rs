//! A growable, vector-backed source model.

use std::cell::RefCell;

use super::notify::ModelNotify;
use super::traits::{Model, ModelRc, ModelTracker};

/// A model backed by a `Vec<T>`.
///
/// Every mutation notifies the attached peers before the mutating call
/// returns:
///
/// ```
/// use trellis::model::{Model, VecModel};
///
/// let model = VecModel::from(vec![10, 9, 8]);
/// model.push(7);
/// assert_eq!(model.row_count(), 4);
/// assert_eq!(model.row_data(3), Some(7));
/// ```
#[derive(Default)]
pub struct VecModel<T> {
    array: RefCell<Vec<T>>,
    notify: ModelNotify,
}

impl<T: 'static> VecModel<T> {
    /// Allocates a new model from a slice.
    pub fn from_slice(slice: &[T]) -> ModelRc<T>
    where
        T: Clone,
    {
        ModelRc::new(Self::from(slice.to_vec()))
    }

    /// Adds a row at the end of the model.
    pub fn push(&self, value: T) {
        self.array.borrow_mut().push(value);
        self.notify.row_added(self.array.borrow().len() - 1, 1);
    }

    /// Inserts a row at `index`, shifting all rows after it.
    ///
    /// # Panics
    ///
    /// Panics if `index > row_count()`.
    pub fn insert(&self, index: usize, value: T) {
        self.array.borrow_mut().insert(index, value);
        self.notify.row_added(index, 1);
    }

    /// Removes and returns the row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= row_count()`.
    pub fn remove(&self, index: usize) -> T {
        let removed = self.array.borrow_mut().remove(index);
        self.notify.row_removed(index, 1);
        removed
    }

    /// Removes all rows.
    ///
    /// Clearing an already-empty model emits nothing; otherwise one reset
    /// notification is delivered.
    pub fn clear(&self) {
        let was_empty = {
            let mut array = self.array.borrow_mut();
            let was_empty = array.is_empty();
            array.clear();
            was_empty
        };
        if !was_empty {
            self.notify.reset();
        }
    }

    /// Replaces the backing vector with new data.
    pub fn set_vec(&self, new: impl Into<Vec<T>>) {
        *self.array.borrow_mut() = new.into();
        self.notify.reset();
    }

    /// Appends the content of the iterator, like [`Vec::extend`].
    pub fn extend<I: IntoIterator<Item = T>>(&self, iter: I) {
        let (old_len, count) = {
            let mut array = self.array.borrow_mut();
            let old_len = array.len();
            array.extend(iter);
            (old_len, array.len() - old_len)
        };
        if count > 0 {
            self.notify.row_added(old_len, count);
        }
    }

    /// Swaps the rows at `a` and `b`, notifying both as changed.
    pub fn swap(&self, a: usize, b: usize) {
        {
            let mut array = self.array.borrow_mut();
            if a >= array.len() || b >= array.len() || a == b {
                return;
            }
            array.swap(a, b);
        }
        self.notify.row_changed(a);
        self.notify.row_changed(b);
    }
}

impl<T: Clone + 'static> VecModel<T> {
    /// Appends all elements in the slice, like [`Vec::extend_from_slice`].
    pub fn extend_from_slice(&self, src: &[T]) {
        if src.is_empty() {
            return;
        }
        let old_len = {
            let mut array = self.array.borrow_mut();
            let old_len = array.len();
            array.extend_from_slice(src);
            old_len
        };
        self.notify.row_added(old_len, src.len());
    }
}

impl<T> From<Vec<T>> for VecModel<T> {
    fn from(array: Vec<T>) -> Self {
        VecModel { array: RefCell::new(array), notify: ModelNotify::default() }
    }
}

impl<T: Clone + 'static> Model for VecModel<T> {
    type Data = T;

    fn row_count(&self) -> usize {
        self.array.borrow().len()
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        self.array.borrow().get(row).cloned()
    }

    fn set_row_data(&self, row: usize, data: Self::Data) {
        {
            let mut array = self.array.borrow_mut();
            let Some(slot) = array.get_mut(row) else {
                trellis_core::trellis_trace!(row, len = array.len(), "set_row_data out of range");
                return;
            };
            *slot = data;
        }
        self.notify.row_changed(row);
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &self.notify
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
