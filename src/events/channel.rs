use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::trace;

pub type Callback<T> = Rc<dyn Fn(&T)>;
pub type SubscriptionId = u64;
type Listeners<T> = RefCell<BTreeMap<SubscriptionId, Callback<T>>>;

pub struct EventEmitter<T: std::fmt::Debug> {
    channel: Channel<T>,
}

impl<T: std::fmt::Debug> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

pub struct EventObserver<T: std::fmt::Debug> {
    channel: Channel<T>,
}

impl<T: std::fmt::Debug> Clone for EventObserver<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

/// Handle for one subscription. Dropping it keeps the listener registered;
/// call `unsubscribe` to remove it.
pub struct Unsubscriber<T: std::fmt::Debug> {
    id: SubscriptionId,
    listeners: Weak<Listeners<T>>,
}

impl<T: std::fmt::Debug> Unsubscriber<T> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns false when the listener was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners.borrow_mut().remove(&self.id).is_some(),
            None => false,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Unsubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsubscriber({})", self.id)
    }
}

pub struct Channel<T: std::fmt::Debug> {
    listeners: Rc<Listeners<T>>,
    next_id: Rc<RefCell<SubscriptionId>>,
}

impl<T: std::fmt::Debug> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
            next_id: Rc::clone(&self.next_id),
        }
    }
}

impl<T: std::fmt::Debug> Channel<T> {
    pub fn new() -> (EventEmitter<T>, EventObserver<T>) {
        let channel = Channel {
            listeners: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Rc::new(RefCell::new(0)),
        };
        (
            EventEmitter {
                channel: channel.clone(),
            },
            EventObserver { channel },
        )
    }

    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut next_id = self.next_id.borrow_mut();
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.listeners.borrow_mut().insert(id, Rc::new(callback));
        Unsubscriber {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }

    /// Listeners run in subscription order and may subscribe or unsubscribe while running.
    pub fn emit(&self, data: &T) {
        let listeners: Vec<Callback<T>> = self.listeners.borrow().values().cloned().collect();
        trace!(target: "events", "Emitting event to {} listeners: {:?}", listeners.len(), data);
        for listener in listeners {
            listener(data);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<T: std::fmt::Debug> EventEmitter<T> {
    pub fn emit(&self, data: &T) {
        self.channel.emit(data);
    }
}

impl<T: std::fmt::Debug> EventObserver<T> {
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        self.channel.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.channel.listener_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_every_listener() {
        let (emitter, observer) = Channel::<u32>::new();
        let sum = Rc::new(Cell::new(0));
        let sum_clone1 = sum.clone();
        let sum_clone2 = sum.clone();

        observer.subscribe(move |n: &u32| sum_clone1.set(sum_clone1.get() + n));
        observer.subscribe(move |n: &u32| sum_clone2.set(sum_clone2.get() + n));

        emitter.emit(&5);
        assert_eq!(sum.get(), 10);
    }

    #[test]
    fn test_clones_share_listeners() {
        let (emitter1, observer1) = Channel::<u32>::new();
        let emitter2 = emitter1.clone();
        let observer2 = observer1.clone();
        let counter = Rc::new(Cell::new(0));

        let counter_clone = counter.clone();
        observer1.subscribe(move |_| counter_clone.set(counter_clone.get() + 1));
        emitter2.emit(&1);
        assert_eq!(counter.get(), 1);

        let counter_clone = counter.clone();
        observer2.subscribe(move |_| counter_clone.set(counter_clone.get() + 1));
        emitter1.emit(&1);
        assert_eq!(counter.get(), 3);
        assert_eq!(observer1.listener_count(), 2);
    }

    #[test]
    fn test_unsubscriber() {
        let (emitter, observer) = Channel::<u32>::new();
        let counter = Rc::new(Cell::new(0));
        let counter_clone = counter.clone();

        let subscription = observer.subscribe(move |_| counter_clone.set(counter_clone.get() + 1));
        let id = subscription.id();
        emitter.emit(&1);
        assert!(subscription.unsubscribe());
        emitter.emit(&1);
        assert_eq!(counter.get(), 1);
        assert!(!observer.unsubscribe(id));
    }

    #[test]
    fn test_listener_may_unsubscribe_during_emit() {
        let (emitter, observer) = Channel::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let observer_clone = observer.clone();

        observer.subscribe(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            observer_clone.unsubscribe(0);
        });
        emitter.emit(&1);
        emitter.emit(&1);
        assert_eq!(calls.get(), 1);
    }
}
