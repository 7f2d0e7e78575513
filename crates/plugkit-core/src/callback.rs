//! Deferred-mutation notification primitive.
//!
//! [`Callback`] runs a set of listener closures synchronously. Adding,
//! removing, or clearing listeners is deferred until the end of the next
//! `invoke` cycle, so a listener may freely subscribe or unsubscribe
//! other listeners (or itself) from inside a delivery without corrupting
//! the iteration.
//!
//! Listeners are held as [`Weak`] references: the [`Rc`] passed to
//! [`Callback::add`] is the subscription handle, and dropping it drops
//! the listener before the next delivery.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Handle identifying a registered listener, for explicit removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

struct Listener<T: ?Sized> {
    id: CallbackId,
    func: Weak<dyn Fn(&T)>,
}

enum Op<T: ?Sized> {
    Add(Listener<T>),
    Remove(CallbackId),
    Clear,
}

/// A synchronous notification channel with deferred listener mutation.
///
/// `T` is the payload type passed by reference to every listener; it may
/// be unsized (`Callback<str>` is a channel of text lines).
pub struct Callback<T: ?Sized> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<Listener<T>>>,
    pending: RefCell<Vec<Op<T>>>,
    paused: Cell<bool>,
}

impl<T: ?Sized> Callback<T> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            paused: Cell::new(false),
        }
    }

    /// Queue a listener for registration.
    ///
    /// Only a weak reference is kept; the caller retains `listener` as
    /// the subscription handle. The listener is not part of the set
    /// until the next `invoke` cycle completes, so the invoke that
    /// immediately follows an `add` does not deliver to it.
    pub fn add(&self, listener: &Rc<dyn Fn(&T)>) -> CallbackId {
        let id = CallbackId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push(Op::Add(Listener {
            id,
            func: Rc::downgrade(listener),
        }));
        id
    }

    /// Queue a listener for removal. Takes effect on the next cycle;
    /// never panics, even mid-delivery or for an unknown id.
    pub fn remove(&self, id: CallbackId) {
        self.pending.borrow_mut().push(Op::Remove(id));
    }

    /// Queue removal of every listener.
    pub fn clear(&self) {
        self.pending.borrow_mut().push(Op::Clear);
    }

    /// Deliver `payload` to every live listener.
    ///
    /// Dead weak references are pruned first, then the live set is
    /// snapshotted, then pending add/remove/clear operations are applied
    /// so they become visible to the *next* cycle. A paused callback
    /// still applies pending operations but delivers nothing.
    pub fn invoke(&self, payload: &T) {
        self.listeners
            .borrow_mut()
            .retain(|l| l.func.strong_count() > 0);

        let snapshot: Vec<Rc<dyn Fn(&T)>> = self
            .listeners
            .borrow()
            .iter()
            .filter_map(|l| l.func.upgrade())
            .collect();

        self.apply_pending();

        if self.paused.get() {
            return;
        }
        for func in snapshot {
            func(payload);
        }
    }

    fn apply_pending(&self) {
        let ops: Vec<Op<T>> = self.pending.borrow_mut().drain(..).collect();
        let mut listeners = self.listeners.borrow_mut();
        for op in ops {
            match op {
                Op::Add(listener) => listeners.push(listener),
                Op::Remove(id) => listeners.retain(|l| l.id != id),
                Op::Clear => listeners.clear(),
            }
        }
    }

    /// Number of live listeners in the current set (pending operations
    /// not yet applied are excluded).
    pub fn len(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.func.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paused(&self) -> bool {
        self.paused.get()
    }

    /// Pause or resume delivery. Pending operations keep flowing either
    /// way.
    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }
}

impl<T: ?Sized> Default for Callback<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback")
            .field("listeners", &self.len())
            .field("paused", &self.paused.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn counting_listener(hits: &Rc<Cell<u32>>) -> Rc<dyn Fn(&u32)> {
        let hits = Rc::clone(hits);
        Rc::new(move |_payload: &u32| hits.set(hits.get() + 1))
    }

    #[test]
    fn add_is_deferred_until_the_second_invoke() {
        let hits = Rc::new(Cell::new(0));
        let listener = counting_listener(&hits);
        let cb: Callback<u32> = Callback::new();

        cb.add(&listener);
        assert_eq!(cb.len(), 0);

        cb.invoke(&1);
        assert_eq!(hits.get(), 0, "first invoke after add must not deliver");
        assert_eq!(cb.len(), 1);

        cb.invoke(&2);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn remove_takes_effect_on_the_next_cycle() {
        let hits = Rc::new(Cell::new(0));
        let listener = counting_listener(&hits);
        let cb: Callback<u32> = Callback::new();

        let id = cb.add(&listener);
        cb.invoke(&0);
        cb.remove(id);
        cb.invoke(&0);
        assert_eq!(hits.get(), 1, "removal is deferred by one cycle");
        cb.invoke(&0);
        assert_eq!(hits.get(), 1);
        assert_eq!(cb.len(), 0);
    }

    #[test]
    fn dropped_listener_is_pruned_before_delivery() {
        let hits = Rc::new(Cell::new(0));
        let listener = counting_listener(&hits);
        let cb: Callback<u32> = Callback::new();

        cb.add(&listener);
        cb.invoke(&0);
        assert_eq!(cb.len(), 1);

        drop(listener);
        assert_eq!(cb.len(), 0);
        cb.invoke(&0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn clear_empties_the_set() {
        let hits = Rc::new(Cell::new(0));
        let a = counting_listener(&hits);
        let b = counting_listener(&hits);
        let cb: Callback<u32> = Callback::new();

        cb.add(&a);
        cb.add(&b);
        cb.invoke(&0);
        assert_eq!(cb.len(), 2);

        cb.clear();
        cb.invoke(&0);
        assert_eq!(hits.get(), 2, "clear applies after the delivery pass");
        cb.invoke(&0);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn paused_callback_delivers_nothing_but_applies_ops() {
        let hits = Rc::new(Cell::new(0));
        let listener = counting_listener(&hits);
        let cb: Callback<u32> = Callback::new();

        cb.add(&listener);
        cb.set_paused(true);
        cb.invoke(&0);
        assert_eq!(cb.len(), 1, "pending add still applied while paused");
        cb.invoke(&0);
        assert_eq!(hits.get(), 0);

        cb.set_paused(false);
        cb.invoke(&0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_mutate_the_set_mid_delivery() {
        let cb: Rc<Callback<u32>> = Rc::new(Callback::new());
        let hits = Rc::new(Cell::new(0));

        let inner = counting_listener(&hits);
        let inner_clone = Rc::clone(&inner);
        let cb_clone = Rc::clone(&cb);
        let outer: Rc<dyn Fn(&u32)> = Rc::new(move |_| {
            cb_clone.add(&inner_clone);
        });

        cb.add(&outer);
        cb.invoke(&0); // registers outer
        cb.invoke(&0); // outer runs, queues inner
        cb.invoke(&0); // inner now registered, delivers
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn payload_is_passed_by_reference() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let listener: Rc<dyn Fn(&str)> = Rc::new(move |line: &str| {
            seen_clone.borrow_mut().push(line.to_string());
        });

        let cb: Callback<str> = Callback::new();
        cb.add(&listener);
        cb.invoke("first");
        cb.invoke("second");
        assert_eq!(*seen.borrow(), vec!["second".to_string()]);
    }
}
