use std::sync::Arc;

use crossbeam_channel::{Receiver, unbounded};

use crate::entry::QueueEntry;

/// Notifications emitted by the queue to its host
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// The contents or order of the queue changed
    QueueChanged {
        entries: Vec<QueueEntry>,
        current_index: usize,
    },
    /// The current entry, or what navigation would do next, changed
    PlaybackChanged {
        current: Option<QueueEntry>,
        current_index: usize,
    },
}

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

/// Registered event callbacks, dispatched in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Callback)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Arc::new(callback)));
        id
    }

    /// Returns false when the id was not registered
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Register a listener that forwards a clone of every event to a channel.
    pub fn subscribe(&mut self) -> (ListenerId, Receiver<QueueEvent>) {
        let (tx, rx) = unbounded();
        let id = self.add(move |event| {
            // A dropped receiver just means nobody is listening any more
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&self, events: &[QueueEvent]) {
        for event in events {
            for (_, callback) in &self.listeners {
                callback(event);
            }
        }
    }

    /// Cheap copy of the current callbacks so they can be invoked without
    /// holding whatever lock guards the registry.
    pub(crate) fn snapshot(&self) -> Vec<Callback> {
        self.listeners.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

pub(crate) fn dispatch_to(callbacks: &[Callback], events: &[QueueEvent]) {
    for event in events {
        for callback in callbacks {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn playback(idx: usize) -> QueueEvent {
        QueueEvent::PlaybackChanged {
            current: None,
            current_index: idx,
        }
    }

    #[test]
    fn dispatches_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            registry.add(move |_| seen.lock().unwrap().push(tag));
        }
        registry.dispatch(&[playback(0)]);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let calls = Arc::new(Mutex::new(0));
        let mut registry = ListenerRegistry::new();
        let counter = Arc::clone(&calls);
        let id = registry.add(move |_| *counter.lock().unwrap() += 1);

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.dispatch(&[playback(0)]);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn subscribe_forwards_events() {
        let mut registry = ListenerRegistry::new();
        let (_id, rx) = registry.subscribe();
        registry.dispatch(&[playback(1), playback(2)]);
        assert_eq!(rx.try_recv().unwrap(), playback(1));
        assert_eq!(rx.try_recv().unwrap(), playback(2));
        assert!(rx.try_recv().is_err());
    }
}
