//! Typed publish/subscribe primitive
//!
//! Every observable attribute on a level object gets its own `Signal`.
//! Subscribers receive a removable `Subscription` handle; nothing is ever
//! disconnected implicitly or by wildcard. Emission is synchronous and
//! snapshot-based, so a slot may disconnect itself, connect new slots, or
//! call back into the emitting object while a notification is in flight.
//!
//! Single-threaded by construction: the slot list is `Rc`/`RefCell` based
//! and signals never cross threads.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct Slot<T: 'static> {
    id: u64,
    callback: Rc<dyn Fn(&T)>,
}

type SlotList<T> = RefCell<Vec<Slot<T>>>;

/// A single-threaded, typed notification channel
pub struct Signal<T: 'static> {
    slots: Rc<SlotList<T>>,
    next_id: Cell<u64>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    /// Connect a callback, returning the handle that removes it again
    ///
    /// The callback stays connected until the handle is disconnected or
    /// dropped.
    pub fn connect(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.slots.borrow_mut().push(Slot {
            id,
            callback: Rc::new(callback),
        });

        let slots = Rc::downgrade(&self.slots);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(slots) = slots.upgrade() {
                    slots.borrow_mut().retain(|slot| slot.id != id);
                }
            })),
        }
    }

    /// Invoke every connected callback, in connection order
    ///
    /// The slot list is snapshotted first: slots connected during emission
    /// are not invoked until the next emission, and slots disconnected
    /// during emission still receive the current one.
    pub(crate) fn emit(&self, value: &T) {
        let callbacks: Vec<_> = self
            .slots
            .borrow()
            .iter()
            .map(|slot| Rc::clone(&slot.callback))
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of currently connected callbacks
    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().len()
    }
}

/// Handle for one connected callback
///
/// Disconnecting (or dropping) removes exactly that callback. The handle
/// holds only a weak reference to the slot list, so it neither keeps the
/// signal alive nor breaks when the signal is gone.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Remove the callback this handle was created for
    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
