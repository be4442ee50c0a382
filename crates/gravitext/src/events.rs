//! Publish/subscribe channel for [`GameEvent`]s.
//!
//! Any number of subscribers can listen; every published event is also kept in a
//! per-frame pending list that the frame runner drains and forwards to the page.

use crate::api::types::GameEvent;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

pub struct EventBus {
    listeners: Vec<(SubscriberId, Listener)>,
    pending: Vec<GameEvent>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            pending: Vec::with_capacity(32),
            next_id: 1,
        }
    }

    /// Register a listener. It sees every event published after this call.
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener, in subscription order, and queue it.
    pub fn publish(&mut self, event: GameEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
        self.pending.push(event);
    }

    /// Events published since the last drain.
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    /// Take all pending events.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn every_subscriber_sees_each_event() {
        let mut bus = EventBus::new();
        let a = Rc::new(RefCell::new(0));
        let b = Rc::new(RefCell::new(0));
        let (a2, b2) = (a.clone(), b.clone());
        bus.subscribe(move |_| *a2.borrow_mut() += 1);
        bus.subscribe(move |_| *b2.borrow_mut() += 1);

        bus.publish(GameEvent::notify("one"));
        bus.publish(GameEvent::notify("two"));

        assert_eq!(*a.borrow(), 2);
        assert_eq!(*b.borrow(), 2);
        assert_eq!(bus.drain().len(), 2);
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        let id = bus.subscribe(move |e| seen2.borrow_mut().push(e.clone()));

        bus.publish(GameEvent::notify("before"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(GameEvent::notify("after"));

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
