//! A fixed-size, array-backed source model.

use std::cell::RefCell;

use super::notify::ModelNotify;
use super::traits::{Model, ModelTracker};

/// A model backed by a `[T; N]`.
///
/// The row count is `N` and never changes, so the only notification this
/// model ever emits is `row_changed` for an in-place write:
///
/// ```
/// use trellis::model::{ArrayModel, Model};
///
/// let model = ArrayModel::from([1, 2, 3]);
/// model.set_row_data(1, 20);
/// assert_eq!(model.row_data(1), Some(20));
/// assert_eq!(model.row_count(), 3);
/// ```
pub struct ArrayModel<T, const N: usize> {
    array: RefCell<[T; N]>,
    notify: ModelNotify,
}

impl<T, const N: usize> From<[T; N]> for ArrayModel<T, N> {
    fn from(array: [T; N]) -> Self {
        Self { array: RefCell::new(array), notify: ModelNotify::default() }
    }
}

impl<T: Default, const N: usize> Default for ArrayModel<T, N> {
    fn default() -> Self {
        Self::from(std::array::from_fn(|_| T::default()))
    }
}

impl<T: Clone + 'static, const N: usize> Model for ArrayModel<T, N> {
    type Data = T;

    fn row_count(&self) -> usize {
        N
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        self.array.borrow().get(row).cloned()
    }

    fn set_row_data(&self, row: usize, data: Self::Data) {
        {
            let mut array = self.array.borrow_mut();
            let Some(slot) = array.get_mut(row) else {
                trellis_core::trellis_trace!(row, len = N, "set_row_data out of range");
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
