//! Typed publish/subscribe for lifecycle events
//!
//! Listeners are removed with [`EventBus::unsubscribe`] as part of their
//! owner's teardown; once removed they are never called again.

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A list of listeners for one event type
pub struct EventBus<E> {
    listeners: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
    next_id: u64,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener
    pub fn publish(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Remove every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::<u32>::new();

        let first = log.clone();
        bus.subscribe(move |v| first.borrow_mut().push(("first", *v)));
        let second = log.clone();
        bus.subscribe(move |v| second.borrow_mut().push(("second", *v)));

        bus.publish(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_no_delivery_after_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::<()>::new();

        let c = count.clone();
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);
        bus.publish(&());
        assert!(bus.unsubscribe(id));
        bus.publish(&());

        assert_eq!(*count.borrow(), 1);
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }
}
