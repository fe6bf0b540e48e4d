//! Change notification: the listener protocol, weak peers, and the
//! [`ModelNotify`] hub that mutable models own.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use trellis_core::Dependency;

use super::traits::ModelTracker;

/// The four notifications a consumer of a model can receive.
///
/// Implementations are invoked synchronously, on the thread that performed
/// the mutation, after the model's backing storage has already been
/// updated. A listener must not mutate the model it is being notified
/// about from within the callback; see [`ModelNotify`] for details.
pub trait ModelChangeListener {
    /// The data of the given row was replaced.
    fn row_changed(&self, row: usize);
    /// `count` rows were inserted starting at `index`.
    fn row_added(&self, index: usize, count: usize);
    /// `count` rows were removed starting at `index`.
    fn row_removed(&self, index: usize, count: usize);
    /// Everything about the model may have changed; re-pull all state.
    fn reset(&self);
}

/// A weak handle to a [`ModelChangeListener`], registered with a model via
/// [`ModelTracker::attach_peer`].
///
/// Peers never extend the listener's lifetime: when the listener is
/// dropped, its peer entries go stale and are discarded on the next
/// notification pass. There is no explicit unregistration.
#[derive(Clone)]
pub struct ModelPeer {
    inner: Weak<dyn ModelChangeListener>,
}

impl ModelPeer {
    /// Creates a peer for the given listener.
    pub fn new(listener: &Rc<impl ModelChangeListener + 'static>) -> Self {
        let weak = Rc::downgrade(listener);
        let inner: Weak<dyn ModelChangeListener> = weak;
        Self { inner }
    }
}

impl<L: ModelChangeListener + 'static> From<&Rc<L>> for ModelPeer {
    fn from(listener: &Rc<L>) -> Self {
        Self::new(listener)
    }
}

/// Dispatches change notifications from a model to its peers and to the
/// ambient dependency-tracking system.
///
/// Every mutable model holds one of these and calls the matching method
/// immediately after altering its backing storage. Delivery is synchronous
/// and completes before the mutating call returns; peers are visited in
/// registration order, and dead peers are pruned during the pass.
///
/// Reentrancy: a listener must not mutate the notifying model from inside
/// its callback. This is not guarded against (nor is a cycle of adapters
/// observing each other); such graphs are unsupported.
#[derive(Default)]
pub struct ModelNotify {
    peers: RefCell<Vec<ModelPeer>>,
    row_count_changed: Dependency,
    /// Per-row dependencies, created on demand by `track_row_data_changes`.
    /// Sorted by row; entries without live dependents are dropped during
    /// structural notifications.
    tracked_rows: RefCell<Vec<(usize, Dependency)>>,
}

impl ModelNotify {
    /// Notify the peers that a specific row was changed.
    pub fn row_changed(&self, row: usize) {
        self.notify_tracked_row(row);
        self.for_each_peer(|peer| peer.row_changed(row));
    }

    /// Notify the peers that rows were added.
    pub fn row_added(&self, index: usize, count: usize) {
        self.notify_structural_change();
        self.for_each_peer(|peer| peer.row_added(index, count));
    }

    /// Notify the peers that rows were removed.
    pub fn row_removed(&self, index: usize, count: usize) {
        self.notify_structural_change();
        self.for_each_peer(|peer| peer.row_removed(index, count));
    }

    /// Notify the peers that the model was reset.
    pub fn reset(&self) {
        self.notify_structural_change();
        self.for_each_peer(|peer| peer.reset());
    }

    /// Marks the row-count dependency and every tracked row dirty.
    ///
    /// Structural changes shift what each row index refers to, so all
    /// tracked rows are treated as changed, not just the ones at or after
    /// the mutation point.
    fn notify_structural_change(&self) {
        self.row_count_changed.notify();
        let mut tracked = self.tracked_rows.borrow_mut();
        for (_, dependency) in tracked.iter() {
            dependency.notify();
        }
        tracked.clear();
    }

    fn notify_tracked_row(&self, row: usize) {
        let mut tracked = self.tracked_rows.borrow_mut();
        if let Ok(position) = tracked.binary_search_by_key(&row, |(r, _)| *r) {
            tracked[position].1.notify();
            // Notification cleared the registration list; the entry is
            // re-created if the row is tracked again.
            tracked.remove(position);
        }
    }

    /// Invokes `f` for every live peer, dropping dead ones.
    fn for_each_peer(&self, f: impl Fn(&dyn ModelChangeListener)) {
        // Upgrade outside the peer-list borrow: a listener may attach
        // further peers (e.g. an adapter re-subscribing) while running.
        let listeners: Vec<Rc<dyn ModelChangeListener>> = {
            let mut peers = self.peers.borrow_mut();
            peers.retain(|peer| peer.inner.strong_count() > 0);
            peers.iter().filter_map(|peer| peer.inner.upgrade()).collect()
        };
        for listener in listeners {
            f(&*listener);
        }
    }
}

impl ModelTracker for ModelNotify {
    fn attach_peer(&self, peer: ModelPeer) {
        let mut peers = self.peers.borrow_mut();
        peers.retain(|existing| existing.inner.strong_count() > 0);
        peers.push(peer);
    }

    fn track_row_count_changes(&self) {
        self.row_count_changed.register();
    }

    fn track_row_data_changes(&self, row: usize) {
        let mut tracked = self.tracked_rows.borrow_mut();
        match tracked.binary_search_by_key(&row, |(r, _)| *r) {
            Ok(position) => tracked[position].1.register(),
            Err(position) => {
                let dependency = Dependency::default();
                dependency.register();
                if dependency.has_dependents() {
                    tracked.insert(position, (row, dependency));
                }
            }
        }
    }
}
