#![forbid(unsafe_code)]

//! Synchronous event emitters and disposable subscriptions.
//!
//! An [`Emitter`] is a cheap-to-clone handle over a shared subscriber list.
//! Dispatch is synchronous and single-threaded: `emit` calls every listener
//! registered at the time of the call, in subscription order, before
//! returning. Each subscription hands back a [`Disposable`] that removes the
//! listener when disposed; disposal is explicit, dropping the handle keeps
//! the listener alive.
//!
//! Listeners registered while an emit is in flight are not called for that
//! emit; listeners disposed mid-flight are skipped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = Box<dyn FnMut(&T)>;

struct Subscribers<T> {
    next_id: u64,
    // The listener box is taken out of its slot for the duration of its own
    // callback so re-entrant subscribe/dispose calls never alias the borrow.
    slots: Vec<(u64, Option<Listener<T>>)>,
}

impl<T> Subscribers<T> {
    fn take(&mut self, id: u64) -> Option<Listener<T>> {
        self.slots
            .iter_mut()
            .find(|(slot_id, _)| *slot_id == id)
            .and_then(|(_, listener)| listener.take())
    }

    fn put_back(&mut self, id: u64, listener: Listener<T>) {
        // The slot is gone when the listener disposed itself mid-call; the
        // box is dropped with it.
        if let Some((_, slot)) = self.slots.iter_mut().find(|(slot_id, _)| *slot_id == id) {
            *slot = Some(listener);
        }
    }

    fn remove(&mut self, id: u64) {
        self.slots.retain(|(slot_id, _)| *slot_id != id);
    }
}

/// A synchronous, single-threaded event emitter handle.
pub struct Emitter<T> {
    inner: Rc<RefCell<Subscribers<T>>>,
}

impl<T: 'static> Emitter<T> {
    /// Create an emitter with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Register a listener. The returned [`Disposable`] removes it.
    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Disposable {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.slots.push((id, Some(Box::new(listener))));
            id
        };
        let weak: Weak<RefCell<Subscribers<T>>> = Rc::downgrade(&self.inner);
        Disposable::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().remove(id);
            }
        })
    }

    /// Dispatch `value` to every listener registered before this call.
    pub fn emit(&self, value: &T) {
        let ids: Vec<u64> = self
            .inner
            .borrow()
            .slots
            .iter()
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            let listener = self.inner.borrow_mut().take(id);
            if let Some(mut listener) = listener {
                listener(value);
                self.inner.borrow_mut().put_back(id, listener);
            }
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// An undoable registration; disposing runs the teardown action once.
pub struct Disposable {
    action: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Disposable {
    /// Wrap a teardown action.
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: Cell::new(Some(Box::new(action))),
        }
    }

    /// A disposable that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            action: Cell::new(None),
        }
    }

    /// Run the teardown action. Subsequent calls are no-ops.
    pub fn dispose(&self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

impl std::fmt::Debug for Disposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Disposable")
    }
}

/// Bulk container for subscriptions torn down together.
#[derive(Debug, Default)]
pub struct DisposableCollection {
    items: Vec<Disposable>,
    disposed: bool,
}

impl DisposableCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a disposable. If the collection is already disposed the item
    /// is disposed immediately.
    pub fn push(&mut self, item: Disposable) {
        if self.disposed {
            item.dispose();
        } else {
            self.items.push(item);
        }
    }

    /// Dispose every tracked item and mark the collection disposed.
    pub fn dispose(&mut self) {
        self.disposed = true;
        for item in self.items.drain(..) {
            item.dispose();
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
