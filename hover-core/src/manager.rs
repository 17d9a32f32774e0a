//! Front ends over [`PlaybackQueue`] that deliver its notifications.
//!
//! [`QueueManager`] is for a single owner driving the queue from one place.
//! [`SharedQueueManager`] is a cloneable handle for hosts that touch the
//! queue from several threads: mutations are serialized and appear atomic
//! to readers, while reads run concurrently with each other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crossbeam_channel::Receiver;

use crate::entry::QueueEntry;
use crate::error::Result;
use crate::events::{ListenerId, ListenerRegistry, QueueEvent, dispatch_to};
use crate::queue::{PlaybackCursor, PlaybackQueue, RepeatMode};
use crate::random::RandomSource;

/// Single-owner queue manager. Listeners run synchronously before each
/// mutating call returns.
#[derive(Debug, Default)]
pub struct QueueManager {
    queue: PlaybackQueue,
    listeners: ListenerRegistry,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_random_source(rng: Box<dyn RandomSource>) -> Self {
        Self {
            queue: PlaybackQueue::with_random_source(rng),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn add_listener<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.listeners.add(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn subscribe(&mut self) -> (ListenerId, Receiver<QueueEvent>) {
        self.listeners.subscribe()
    }

    fn mutate<T>(&mut self, op: impl FnOnce(&mut PlaybackQueue) -> T) -> T {
        let out = op(&mut self.queue);
        let events = self.queue.drain_events();
        self.listeners.dispatch(&events);
        out
    }

    pub fn set_queue(&mut self, entries: Vec<QueueEntry>) -> Result<()> {
        self.mutate(|q| q.set_queue(entries))
    }

    pub fn add_entry(&mut self, entry: QueueEntry, at: Option<usize>) -> Result<()> {
        self.mutate(|q| q.add_entry(entry, at))
    }

    pub fn remove_entry(&mut self, pos: usize) -> Result<QueueEntry> {
        self.mutate(|q| q.remove_entry(pos))
    }

    pub fn clear(&mut self) {
        self.mutate(PlaybackQueue::clear)
    }

    pub fn next(&mut self) -> Option<QueueEntry> {
        self.mutate(PlaybackQueue::next)
    }

    pub fn previous(&mut self) -> Option<QueueEntry> {
        self.mutate(PlaybackQueue::previous)
    }

    pub fn seek_to_index(&mut self, index: usize) -> Result<()> {
        self.mutate(|q| q.seek_to_index(index))
    }

    pub fn set_shuffle_mode(&mut self, enabled: bool) {
        self.mutate(|q| q.set_shuffle_mode(enabled))
    }

    pub fn set_shuffle_wraps(&mut self, wraps: bool) {
        self.queue.set_shuffle_wraps(wraps);
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.mutate(|q| q.set_repeat_mode(mode))
    }

    /// Read-only view of the underlying queue
    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn current_entry(&self) -> Option<QueueEntry> {
        self.queue.current_entry()
    }

    pub fn peek_next(&self) -> Option<QueueEntry> {
        self.queue.peek_next()
    }

    pub fn peek_previous(&self) -> Option<QueueEntry> {
        self.queue.peek_previous()
    }

    /// Copy of the queue contents
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.queue.entries().to_vec()
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.queue.cursor()
    }
}

/// Thread-safe, cloneable queue manager.
///
/// Listeners are invoked after the state lock is released, in mutation
/// order. A listener must not call a mutating method on the same manager
/// from inside its callback; hand the work to another thread instead.
#[derive(Debug, Clone, Default)]
pub struct SharedQueueManager {
    inner: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    state: RwLock<PlaybackQueue>,
    listeners: Mutex<ListenerRegistry>,
    /// Held across mutate-then-dispatch so notifications keep mutation order
    mutation: Mutex<()>,
}

impl SharedQueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_random_source(rng: Box<dyn RandomSource>) -> Self {
        Self::from_queue(PlaybackQueue::with_random_source(rng))
    }

    pub fn from_queue(queue: PlaybackQueue) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(queue),
                listeners: Mutex::new(ListenerRegistry::new()),
                mutation: Mutex::new(()),
            }),
        }
    }

    // A panicking listener must not wedge the queue for every other thread,
    // so poisoned locks are recovered rather than propagated.
    fn read(&self) -> RwLockReadGuard<'_, PlaybackQueue> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PlaybackQueue> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners(&self) -> MutexGuard<'_, ListenerRegistry> {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut PlaybackQueue) -> T) -> T {
        let _serial = self
            .inner
            .mutation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (out, events) = {
            let mut state = self.write();
            let out = op(&mut *state);
            (out, state.drain_events())
        };
        if !events.is_empty() {
            let callbacks = self.listeners().snapshot();
            dispatch_to(&callbacks, &events);
        }
        out
    }

    pub fn add_listener<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        self.listeners().add(callback)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners().remove(id)
    }

    pub fn subscribe(&self) -> (ListenerId, Receiver<QueueEvent>) {
        self.listeners().subscribe()
    }

    pub fn set_queue(&self, entries: Vec<QueueEntry>) -> Result<()> {
        self.mutate(|q| q.set_queue(entries))
    }

    pub fn add_entry(&self, entry: QueueEntry, at: Option<usize>) -> Result<()> {
        self.mutate(|q| q.add_entry(entry, at))
    }

    pub fn remove_entry(&self, pos: usize) -> Result<QueueEntry> {
        self.mutate(|q| q.remove_entry(pos))
    }

    pub fn clear(&self) {
        self.mutate(PlaybackQueue::clear)
    }

    pub fn next(&self) -> Option<QueueEntry> {
        self.mutate(PlaybackQueue::next)
    }

    pub fn previous(&self) -> Option<QueueEntry> {
        self.mutate(PlaybackQueue::previous)
    }

    pub fn seek_to_index(&self, index: usize) -> Result<()> {
        self.mutate(|q| q.seek_to_index(index))
    }

    pub fn set_shuffle_mode(&self, enabled: bool) {
        self.mutate(|q| q.set_shuffle_mode(enabled))
    }

    pub fn set_shuffle_wraps(&self, wraps: bool) {
        self.mutate(|q| q.set_shuffle_wraps(wraps))
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.mutate(|q| q.set_repeat_mode(mode))
    }

    pub fn current_entry(&self) -> Option<QueueEntry> {
        self.read().current_entry()
    }

    pub fn peek_next(&self) -> Option<QueueEntry> {
        self.read().peek_next()
    }

    pub fn peek_previous(&self) -> Option<QueueEntry> {
        self.read().peek_previous()
    }

    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.read().entries().to_vec()
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.read().cursor()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.read().shuffle_enabled()
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.read().repeat_mode()
    }

    /// Run a read-only closure against a consistent view of the queue.
    pub fn inspect<T>(&self, f: impl FnOnce(&PlaybackQueue) -> T) -> T {
        f(&*self.read())
    }
}
