//! Synchronous callback registry for push-based state channels.
//!
//! # Invariants
//! - Delivery is synchronous and follows subscription order.
//! - Subscription ids are never reused within one registry.

use std::fmt::{Debug, Formatter};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T)>;

/// Ordered list of subscriber callbacks for values of type `T`.
pub struct Subscribers<T: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<T: ?Sized> Debug for Subscribers<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<T: ?Sized> Subscribers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` and immediately replays `current` to it.
    pub fn subscribe(
        &mut self,
        current: &T,
        mut callback: impl FnMut(&T) + 'static,
    ) -> SubscriptionId {
        callback(current);
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Removes one subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Delivers `value` to every subscriber in subscription order.
    pub fn emit(&mut self, value: &T) {
        for (_, callback) in &mut self.entries {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Subscribers;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_replays_current_value_then_receives_emits_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subscribers: Subscribers<[u32]> = Subscribers::new();

        let first = Rc::clone(&log);
        subscribers.subscribe(&[1][..], move |value: &[u32]| {
            first.borrow_mut().push(("a", value.to_vec()))
        });
        let second = Rc::clone(&log);
        subscribers.subscribe(&[1][..], move |value: &[u32]| {
            second.borrow_mut().push(("b", value.to_vec()))
        });
        subscribers.emit(&[1, 2][..]);

        assert_eq!(
            *log.borrow(),
            vec![
                ("a", vec![1]),
                ("b", vec![1]),
                ("a", vec![1, 2]),
                ("b", vec![1, 2]),
            ]
        );
    }

    #[test]
    fn unsubscribed_callback_stops_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut subscribers: Subscribers<u32> = Subscribers::new();

        let counter = Rc::clone(&count);
        let id = subscribers.subscribe(&0, move |_| *counter.borrow_mut() += 1);
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.emit(&5);

        assert_eq!(*count.borrow(), 1);
        assert!(subscribers.is_empty());
    }
}
