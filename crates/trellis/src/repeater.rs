//! The repeater: one UI instance per model row, updated incrementally.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trellis_core::{Dependency, EvalScope};

use crate::model::{Model, ModelChangeListener, ModelPeer, ModelRc};

/// An instance driven by one row of a model.
///
/// The repeater creates instances through the `init` closure passed to
/// [`Repeater::ensure_updated`], pushes row data into them with
/// [`update`](Self::update), and calls [`init`](Self::init) once after the
/// first update.
pub trait RepeatedInstance {
    /// The data of the row driving this instance.
    type Data;

    /// Synchronizes this instance with the given row index and data.
    fn update(&self, index: usize, data: Self::Data);

    /// Called once, after the instance received its first update.
    fn init(&self) {}
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum EntryState {
    /// The instance is in sync with its row.
    Clean,
    /// The row data is stale and needs to be pushed again.
    Dirty,
}

/// Viewport feedback for the list-view update path.
///
/// The repeater writes the virtual extent of the full model into
/// `viewport_height`/`viewport_width` and clamps `viewport_y`; the host
/// feeds the (possibly scrolled) `viewport_y` back in on the next pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListViewLayout {
    /// Width of the virtual viewport.
    pub viewport_width: f32,
    /// Height of the virtual viewport: item height times row count.
    pub viewport_height: f32,
    /// Scroll position, zero or negative.
    pub viewport_y: f32,
}

/// The peer half of the repeater. Replaced wholesale when the bound model
/// changes identity, so peers attached to previous models go stale and get
/// pruned instead of corrupting the new entry set.
struct RepeaterInner<C: RepeatedInstance> {
    entries: RefCell<Vec<(EntryState, Option<Rc<C>>)>>,
    /// Model row of the first entry. Stays 0 unless the list-view path
    /// windows the model.
    offset: Cell<usize>,
    /// Row count or row content changed since the last update pass.
    dirty: Cell<bool>,
    /// Shared with the owning repeater; survives inner replacement so
    /// consumers registered before a model swap still re-run.
    dirty_dep: Rc<Dependency>,
}

impl<C: RepeatedInstance> RepeaterInner<C> {
    fn new(dirty_dep: Rc<Dependency>) -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            offset: Cell::new(0),
            dirty: Cell::new(true),
            dirty_dep,
        }
    }

    fn mark_dirty(&self) {
        self.dirty.set(true);
        self.dirty_dep.notify();
    }
}

impl<C: RepeatedInstance> ModelChangeListener for RepeaterInner<C> {
    fn row_changed(&self, row: usize) {
        self.mark_dirty();
        let offset = self.offset.get();
        if let Some(entry) = self.entries.borrow_mut().get_mut(row.wrapping_sub(offset)) {
            entry.0 = EntryState::Dirty;
        }
    }

    fn row_added(&self, mut index: usize, mut count: usize) {
        // Translate into the entry window.
        let offset = self.offset.get();
        if index < offset {
            if index + count < offset {
                return;
            }
            count -= offset - index;
            index = 0;
        } else {
            index -= offset;
        }
        let mut entries = self.entries.borrow_mut();
        if count == 0 || index > entries.len() {
            return;
        }
        self.mark_dirty();
        entries.splice(
            index..index,
            std::iter::repeat_with(|| (EntryState::Dirty, None)).take(count),
        );
        // Every entry behind the insertion now drives a shifted row.
        for entry in entries[index + count..].iter_mut() {
            entry.0 = EntryState::Dirty;
        }
    }

    fn row_removed(&self, mut index: usize, mut count: usize) {
        let offset = self.offset.get();
        if index < offset {
            if index + count < offset {
                return;
            }
            count -= offset - index;
            index = 0;
        } else {
            index -= offset;
        }
        let mut entries = self.entries.borrow_mut();
        if count == 0 || index >= entries.len() {
            return;
        }
        if index + count > entries.len() {
            count = entries.len() - index;
        }
        self.mark_dirty();
        entries.drain(index..index + count);
        for entry in entries[index..].iter_mut() {
            entry.0 = EntryState::Dirty;
        }
    }

    fn reset(&self) {
        self.mark_dirty();
        self.entries.borrow_mut().clear();
    }
}

/// Drives one [`RepeatedInstance`] per row of a model.
///
/// The repeater listens to its model as a peer and keeps a `Clean`/`Dirty`
/// entry per row. [`ensure_updated`](Self::ensure_updated) reconciles:
/// entries are created lazily, destroyed when their row disappears, and
/// re-synced with fresh row data when marked dirty — untouched rows keep
/// their instances.
pub struct Repeater<C: RepeatedInstance + 'static> {
    inner: RefCell<Rc<RepeaterInner<C>>>,
    dirty_dep: Rc<Dependency>,
    model: RefCell<ModelRc<C::Data>>,
    model_binding: RefCell<Option<Box<dyn Fn() -> ModelRc<C::Data>>>>,
    binding_scope: EvalScope,
    /// A new binding was installed and has not been evaluated yet.
    binding_stale: Cell<bool>,
}

impl<C: RepeatedInstance + 'static> Default for Repeater<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: RepeatedInstance + 'static> Repeater<C> {
    /// Creates a repeater with an empty model.
    pub fn new() -> Self {
        let dirty_dep = Rc::new(Dependency::default());
        Self {
            inner: RefCell::new(Rc::new(RepeaterInner::new(dirty_dep.clone()))),
            dirty_dep,
            model: RefCell::new(ModelRc::default()),
            model_binding: RefCell::new(None),
            binding_scope: EvalScope::new(),
            binding_stale: Cell::new(false),
        }
    }

    fn inner(&self) -> Rc<RepeaterInner<C>> {
        self.inner.borrow().clone()
    }

    /// Binds the repeater to a fixed model handle.
    pub fn set_model(&self, model: ModelRc<C::Data>) {
        *self.model_binding.borrow_mut() = None;
        self.binding_stale.set(false);
        self.adopt_model(model);
    }

    /// Binds the repeater to a model-producing closure.
    ///
    /// The closure is evaluated under the repeater's tracking scope, so any
    /// [`Dependency`] it registers re-triggers evaluation on the next
    /// update pass after a change.
    pub fn set_model_binding(&self, binding: impl Fn() -> ModelRc<C::Data> + 'static) {
        *self.model_binding.borrow_mut() = Some(Box::new(binding));
        self.binding_stale.set(true);
        self.inner().mark_dirty();
    }

    /// Re-evaluates the model binding if needed and returns the current
    /// model.
    fn current_model(&self) -> ModelRc<C::Data> {
        let needs_eval = {
            let binding = self.model_binding.borrow();
            binding.is_some() && (self.binding_stale.get() || self.binding_scope.is_dirty())
        };
        if needs_eval {
            let new_model = {
                let binding = self.model_binding.borrow();
                match binding.as_ref() {
                    Some(produce) => self.binding_scope.evaluate(|| produce()),
                    None => ModelRc::default(),
                }
            };
            self.binding_stale.set(false);
            self.adopt_model(new_model);
        }
        self.model.borrow().clone()
    }

    /// Installs `new_model` as the bound model.
    ///
    /// A different model identity discards every entry and attaches a fresh
    /// peer to the new model (stale peers held by the previous model die
    /// with the replaced inner). Re-adopting the same model conservatively
    /// marks all entries for resync.
    fn adopt_model(&self, new_model: ModelRc<C::Data>) {
        if *self.model.borrow() != new_model {
            let fresh = Rc::new(RepeaterInner::new(self.dirty_dep.clone()));
            new_model.model_tracker().attach_peer(ModelPeer::new(&fresh));
            *self.inner.borrow_mut() = fresh;
            *self.model.borrow_mut() = new_model;
            self.dirty_dep.notify();
        } else {
            let inner = self.inner();
            for entry in inner.entries.borrow_mut().iter_mut() {
                entry.0 = EntryState::Dirty;
            }
            inner.mark_dirty();
        }
    }

    /// Brings the instance set in sync with the model.
    ///
    /// `init` creates one new instance; it is invoked once per row that has
    /// no instance yet. Even when nothing changed, the pass registers the
    /// repeater with the ambient evaluation scope so the caller re-runs
    /// after the next model change.
    pub fn ensure_updated(&self, init: impl Fn() -> Rc<C>) {
        let model = self.current_model();
        self.dirty_dep.register();
        model.model_tracker().track_row_count_changes();
        let inner = self.inner();
        if inner.dirty.get() {
            self.ensure_updated_impl(&inner, &init, &model, model.row_count());
        }
    }

    /// Returns `true` if any instance was created.
    fn ensure_updated_impl(
        &self,
        inner: &RepeaterInner<C>,
        init: &impl Fn() -> Rc<C>,
        model: &ModelRc<C::Data>,
        count: usize,
    ) -> bool {
        let mut entries = inner.entries.borrow_mut();
        entries.resize_with(count, || (EntryState::Dirty, None));
        let offset = inner.offset.get();
        let mut any_created = false;
        for (i, entry) in entries.iter_mut().enumerate() {
            if entry.0 == EntryState::Dirty {
                let created = entry.1.is_none();
                if created {
                    entry.1 = Some(init());
                    any_created = true;
                }
                if let (Some(instance), Some(data)) = (entry.1.as_ref(), model.row_data(i + offset))
                {
                    instance.update(i + offset, data);
                    if created {
                        instance.init();
                    }
                }
                entry.0 = EntryState::Clean;
            }
        }
        drop(entries);
        inner.dirty.set(false);
        any_created
    }

    /// List-view variant of [`ensure_updated`](Self::ensure_updated): only
    /// the rows visible in a viewport of `listview_height` get instances,
    /// assuming a uniform `item_height` per row.
    ///
    /// Scrolling is expressed through `layout.viewport_y`; the entry window
    /// is rotated so instances of still-visible rows survive the scroll.
    pub fn ensure_updated_listview(
        &self,
        init: impl Fn() -> Rc<C>,
        layout: &mut ListViewLayout,
        listview_width: f32,
        listview_height: f32,
        item_height: f32,
    ) {
        layout.viewport_width = listview_width;
        let model = self.current_model();
        self.dirty_dep.register();
        model.model_tracker().track_row_count_changes();
        let inner = self.inner();

        let row_count = model.row_count();
        if row_count == 0 || item_height <= 0.0 {
            inner.entries.borrow_mut().clear();
            inner.offset.set(0);
            inner.dirty.set(false);
            layout.viewport_height = 0.0;
            layout.viewport_y = 0.0;
            return;
        }

        layout.viewport_height = item_height * row_count as f32;
        layout.viewport_y = layout
            .viewport_y
            .max(-(layout.viewport_height - listview_height).max(0.0))
            .min(0.0);

        let offset = ((-layout.viewport_y / item_height).floor() as usize).min(row_count - 1);
        let count = ((listview_height / item_height).ceil() as usize).min(row_count - offset);
        self.set_offset(&inner, offset, count);
        self.ensure_updated_impl(&inner, &init, &model, count);
    }

    /// Rotates the entry window to start at `offset`, keeping entries for
    /// rows present in both the old and the new window.
    fn set_offset(&self, inner: &RepeaterInner<C>, offset: usize, count: usize) {
        let mut entries = inner.entries.borrow_mut();
        let old_offset = inner.offset.get();
        let to_remove = offset.saturating_sub(old_offset);
        if to_remove < entries.len() {
            entries.splice(
                0..to_remove,
                std::iter::repeat_with(|| (EntryState::Dirty, None))
                    .take(old_offset.saturating_sub(offset)),
            );
        } else {
            entries.clear();
        }
        entries.resize_with(count, || (EntryState::Dirty, None));
        drop(entries);
        inner.offset.set(offset);
        inner.dirty.set(true);
    }

    /// Writes a row's data back through the model (e.g. after the user
    /// edited a repeated element), then immediately resyncs the affected
    /// instance.
    ///
    /// # Panics
    ///
    /// Panics if the repeater is out of sync with its model. A write-back
    /// arriving mid-resync means the host mutated the model reentrantly;
    /// that is a programming error, not a recoverable condition.
    pub fn model_set_row_data(&self, row: usize, data: C::Data) {
        let model = self.current_model();
        let inner = self.inner();
        assert!(
            !inner.dirty.get(),
            "model_set_row_data called while the repeater is out of sync with its model; \
             run ensure_updated first"
        );
        model.set_row_data(row, data);
        let offset = inner.offset.get();
        if let Some(entry) = inner.entries.borrow_mut().get_mut(row.wrapping_sub(offset)) {
            if entry.0 == EntryState::Dirty {
                if let (Some(instance), Some(new_data)) = (entry.1.as_ref(), model.row_data(row)) {
                    instance.update(row, new_data);
                    entry.0 = EntryState::Clean;
                }
            }
        }
    }

    /// Calls `visitor` for every live instance in window order, passing the
    /// model row it represents. Stops early and returns `false` when the
    /// visitor returns `false`.
    pub fn visit(&self, mut visitor: impl FnMut(usize, &Rc<C>) -> bool) -> bool {
        // Instances are cloned out first: the visitor may cause model reads
        // that must not observe a held borrow.
        let inner = self.inner();
        let offset = inner.offset.get();
        let instances: Vec<(usize, Rc<C>)> = inner
            .entries
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.1.clone().map(|instance| (i + offset, instance)))
            .collect();
        for (row, instance) in &instances {
            if !visitor(*row, instance) {
                return false;
            }
        }
        true
    }

    /// The number of entries currently held.
    pub fn len(&self) -> usize {
        self.inner().entries.borrow().len()
    }

    /// Returns `true` if the repeater holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The range of model rows covered by the current entries. Starts at a
    /// non-zero row when the list-view path windows the model.
    pub fn range(&self) -> std::ops::Range<usize> {
        let inner = self.inner();
        let offset = inner.offset.get();
        offset..offset + inner.entries.borrow().len()
    }

    /// Returns the instance for the given model row, if it is within
    /// [`range`](Self::range) and has been created.
    pub fn instance_at(&self, row: usize) -> Option<Rc<C>> {
        let inner = self.inner();
        let offset = inner.offset.get();
        let entries = inner.entries.borrow();
        entries.get(row.checked_sub(offset)?).and_then(|entry| entry.1.clone())
    }

    /// Returns all live instances in window order.
    pub fn instances_vec(&self) -> Vec<Rc<C>> {
        self.inner().entries.borrow().iter().filter_map(|entry| entry.1.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VecModel;

    #[derive(Default)]
    struct TestInstance {
        updates: RefCell<Vec<(usize, i32)>>,
        value: Cell<i32>,
        initialized: Cell<bool>,
    }

    impl RepeatedInstance for TestInstance {
        type Data = i32;

        fn update(&self, index: usize, data: i32) {
            self.updates.borrow_mut().push((index, data));
            self.value.set(data);
        }

        fn init(&self) {
            self.initialized.set(true);
        }
    }

    struct Harness {
        repeater: Repeater<TestInstance>,
        created: Rc<Cell<usize>>,
    }

    impl Harness {
        fn new() -> Self {
            Self { repeater: Repeater::new(), created: Rc::new(Cell::new(0)) }
        }

        fn update(&self) {
            let created = self.created.clone();
            self.repeater.ensure_updated(move || {
                created.set(created.get() + 1);
                Rc::new(TestInstance::default())
            });
        }

        fn update_listview(&self, layout: &mut ListViewLayout, height: f32, item_height: f32) {
            let created = self.created.clone();
            self.repeater.ensure_updated_listview(
                move || {
                    created.set(created.get() + 1);
                    Rc::new(TestInstance::default())
                },
                layout,
                100.0,
                height,
                item_height,
            );
        }

        fn values(&self) -> Vec<i32> {
            self.repeater.instances_vec().iter().map(|instance| instance.value.get()).collect()
        }
    }

    #[test]
    fn push_creates_only_the_new_instance() {
        let model = Rc::new(VecModel::from(vec![100, 0]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        harness.update();
        assert_eq!(harness.repeater.len(), 2);
        assert_eq!(harness.created.get(), 2);
        let first = harness.repeater.instance_at(0).unwrap();
        let second = harness.repeater.instance_at(1).unwrap();
        assert!(first.initialized.get() && second.initialized.get());

        model.push(75);
        harness.update();
        assert_eq!(harness.repeater.len(), 3);
        assert_eq!(harness.created.get(), 3);

        // The first two survived untouched.
        assert!(Rc::ptr_eq(&first, &harness.repeater.instance_at(0).unwrap()));
        assert!(Rc::ptr_eq(&second, &harness.repeater.instance_at(1).unwrap()));
        assert_eq!(first.updates.borrow().len(), 1);
        assert_eq!(second.updates.borrow().len(), 1);

        let third = harness.repeater.instance_at(2).unwrap();
        assert_eq!(third.value.get(), 75);
        assert!(third.initialized.get());
        assert_eq!(harness.values(), vec![100, 0, 75]);
    }

    #[test]
    fn clean_pass_touches_nothing() {
        let model = Rc::new(VecModel::from(vec![1, 2]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        harness.update();
        harness.update();
        assert_eq!(harness.created.get(), 2);
        let first = harness.repeater.instance_at(0).unwrap();
        assert_eq!(first.updates.borrow().len(), 1);
    }

    #[test]
    fn changed_row_is_resynced_alone() {
        let model = Rc::new(VecModel::from(vec![1, 2, 3]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));
        harness.update();

        model.set_row_data(1, 20);
        harness.update();

        let untouched = harness.repeater.instance_at(0).unwrap();
        let resynced = harness.repeater.instance_at(1).unwrap();
        assert_eq!(untouched.updates.borrow().len(), 1);
        assert_eq!(*resynced.updates.borrow(), vec![(1, 2), (1, 20)]);
        assert_eq!(harness.created.get(), 3);
    }

    #[test]
    fn removal_destroys_the_instance_and_reindexes_the_rest() {
        let model = Rc::new(VecModel::from(vec![10, 20, 30]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));
        harness.update();
        let second = harness.repeater.instance_at(1).unwrap();

        model.remove(0);
        harness.update();

        assert_eq!(harness.repeater.len(), 2);
        assert_eq!(harness.created.get(), 3);
        // The old second instance now drives row 0.
        assert!(Rc::ptr_eq(&second, &harness.repeater.instance_at(0).unwrap()));
        assert_eq!(second.updates.borrow().last().copied(), Some((0, 20)));
        assert_eq!(harness.values(), vec![20, 30]);
    }

    #[test]
    fn reset_discards_every_instance() {
        let model = Rc::new(VecModel::from(vec![1, 2]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));
        harness.update();

        model.set_vec(vec![7, 8, 9]);
        harness.update();
        assert_eq!(harness.repeater.len(), 3);
        assert_eq!(harness.created.get(), 5);
        assert_eq!(harness.values(), vec![7, 8, 9]);
    }

    #[test]
    fn model_identity_swap_discards_entries() {
        let first_model = Rc::new(VecModel::from(vec![1]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(first_model.clone()));
        harness.update();
        let old_instance = harness.repeater.instance_at(0).unwrap();

        harness.repeater.set_model(ModelRc::from(Rc::new(VecModel::from(vec![5, 6]))));
        harness.update();

        assert_eq!(harness.repeater.len(), 2);
        assert!(!Rc::ptr_eq(&old_instance, &harness.repeater.instance_at(0).unwrap()));
        assert_eq!(harness.values(), vec![5, 6]);

        // The old model no longer reaches the repeater.
        first_model.push(9);
        harness.update();
        assert_eq!(harness.repeater.len(), 2);
        assert_eq!(harness.values(), vec![5, 6]);
    }

    #[test]
    fn model_binding_reevaluates_when_its_dependency_fires() {
        let toggle = Rc::new(Cell::new(false));
        let toggle_dep = Rc::new(Dependency::default());
        let model_a = ModelRc::from(Rc::new(VecModel::from(vec![1])));
        let model_b = ModelRc::from(Rc::new(VecModel::from(vec![2, 3])));

        let harness = Harness::new();
        let (toggle_read, dep_read) = (toggle.clone(), toggle_dep.clone());
        let (a, b) = (model_a.clone(), model_b.clone());
        harness.repeater.set_model_binding(move || {
            dep_read.register();
            if toggle_read.get() { b.clone() } else { a.clone() }
        });

        harness.update();
        assert_eq!(harness.values(), vec![1]);

        toggle.set(true);
        toggle_dep.notify();
        harness.update();
        assert_eq!(harness.values(), vec![2, 3]);
        assert_eq!(harness.created.get(), 3);
    }

    #[test]
    fn update_pass_registers_with_the_ambient_scope() {
        let model = Rc::new(VecModel::from(vec![1]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        let scope = EvalScope::new();
        scope.evaluate(|| harness.update());
        assert!(!scope.is_dirty());

        model.push(2);
        assert!(scope.is_dirty());
    }

    #[test]
    fn scope_survives_model_swap() {
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(Rc::new(VecModel::from(vec![1]))));

        let scope = EvalScope::new();
        scope.evaluate(|| harness.update());
        assert!(!scope.is_dirty());

        // Swapping the model must re-trigger consumers registered before.
        harness.repeater.set_model(ModelRc::from(Rc::new(VecModel::from(vec![2]))));
        assert!(scope.is_dirty());
    }

    #[test]
    fn write_back_resyncs_the_edited_instance() {
        let model = Rc::new(VecModel::from(vec![1, 2]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));
        harness.update();

        harness.repeater.model_set_row_data(0, 11);
        assert_eq!(model.row_data(0), Some(11));
        let edited = harness.repeater.instance_at(0).unwrap();
        assert_eq!(edited.value.get(), 11);
        assert_eq!(edited.updates.borrow().len(), 2);
    }

    #[test]
    #[should_panic(expected = "out of sync")]
    fn write_back_while_dirty_is_fatal() {
        let model = Rc::new(VecModel::from(vec![1, 2]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));
        // No ensure_updated: the repeater is still dirty.
        harness.repeater.model_set_row_data(0, 11);
    }

    #[test]
    fn visit_walks_live_instances_and_can_abort() {
        let model = Rc::new(VecModel::from(vec![5, 6, 7]));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));
        harness.update();

        let mut seen = Vec::new();
        let completed = harness.repeater.visit(|row, instance| {
            seen.push((row, instance.value.get()));
            true
        });
        assert!(completed);
        assert_eq!(seen, vec![(0, 5), (1, 6), (2, 7)]);

        let mut first_only = Vec::new();
        let completed = harness.repeater.visit(|row, _| {
            first_only.push(row);
            false
        });
        assert!(!completed);
        assert_eq!(first_only, vec![0]);
    }

    #[test]
    fn listview_windows_the_model() {
        let model = Rc::new(VecModel::from((0..10).collect::<Vec<i32>>()));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        let mut layout = ListViewLayout::default();
        harness.update_listview(&mut layout, 30.0, 10.0);

        assert_eq!(layout.viewport_width, 100.0);
        assert_eq!(layout.viewport_height, 100.0);
        assert_eq!(harness.repeater.range(), 0..3);
        assert_eq!(harness.values(), vec![0, 1, 2]);
        assert_eq!(harness.created.get(), 3);
    }

    #[test]
    fn listview_scroll_keeps_overlapping_instances() {
        let model = Rc::new(VecModel::from((0..10).collect::<Vec<i32>>()));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        let mut layout = ListViewLayout::default();
        harness.update_listview(&mut layout, 30.0, 10.0);
        let row1 = harness.repeater.instance_at(1).unwrap();
        let row2 = harness.repeater.instance_at(2).unwrap();

        // Scroll down one row: window 0..3 becomes 1..4.
        layout.viewport_y = -15.0;
        harness.update_listview(&mut layout, 30.0, 10.0);

        assert_eq!(harness.repeater.range(), 1..4);
        assert!(Rc::ptr_eq(&row1, &harness.repeater.instance_at(1).unwrap()));
        assert!(Rc::ptr_eq(&row2, &harness.repeater.instance_at(2).unwrap()));
        assert_eq!(row1.updates.borrow().len(), 1);
        assert_eq!(harness.created.get(), 4);
        assert_eq!(harness.values(), vec![1, 2, 3]);

        // Scroll back up: window 1..4 becomes 0..3 again.
        layout.viewport_y = 0.0;
        harness.update_listview(&mut layout, 30.0, 10.0);
        assert_eq!(harness.repeater.range(), 0..3);
        assert_eq!(harness.values(), vec![0, 1, 2]);
    }

    #[test]
    fn listview_clamps_overscroll() {
        let model = Rc::new(VecModel::from((0..4).collect::<Vec<i32>>()));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        let mut layout = ListViewLayout::default();
        layout.viewport_y = -1000.0;
        harness.update_listview(&mut layout, 30.0, 10.0);

        // 4 rows of height 10 against a 30-high view: at most 10 off-screen.
        assert_eq!(layout.viewport_y, -10.0);
        assert_eq!(harness.repeater.range(), 1..4);
    }

    #[test]
    fn listview_empty_model_clears_viewport() {
        let model = Rc::new(VecModel::<i32>::default());
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        let mut layout =
            ListViewLayout { viewport_width: 0.0, viewport_height: 50.0, viewport_y: -5.0 };
        harness.update_listview(&mut layout, 30.0, 10.0);

        assert!(harness.repeater.is_empty());
        assert_eq!(layout.viewport_height, 0.0);
        assert_eq!(layout.viewport_y, 0.0);
    }

    #[test]
    fn changes_outside_the_window_are_clipped() {
        let model = Rc::new(VecModel::from((0..10).collect::<Vec<i32>>()));
        let harness = Harness::new();
        harness.repeater.set_model(ModelRc::from(model.clone()));

        let mut layout = ListViewLayout { viewport_y: -50.0, ..Default::default() };
        harness.update_listview(&mut layout, 30.0, 10.0);
        assert_eq!(harness.repeater.range(), 5..8);
        let created_before = harness.created.get();

        // A change before the window leaves the entries untouched.
        model.set_row_data(0, 99);
        harness.update_listview(&mut layout, 30.0, 10.0);
        assert_eq!(harness.created.get(), created_before);
        assert_eq!(harness.values(), vec![5, 6, 7]);
    }
}
