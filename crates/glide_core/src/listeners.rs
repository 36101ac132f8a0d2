//! Ordered listener sets
//!
//! Each observable event owns a `ListenerSet`. Callbacks run in registration
//! order and are removed through the handle returned by [`ListenerSet::add`].

use indexmap::IndexMap;

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listener callback type
pub type Listener<E> = Box<dyn FnMut(&mut E)>;

/// Ordered set of callbacks for one event
pub struct ListenerSet<E> {
    next_id: u64,
    listeners: IndexMap<ListenerId, Listener<E>>,
}

impl<E> ListenerSet<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: IndexMap::new(),
        }
    }

    /// Register a listener, returning its removal handle
    pub fn add<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Remove a listener. Returns false if the handle was unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.shift_remove(&id).is_some()
    }

    /// Invoke every listener in registration order
    pub fn emit(&mut self, event: &mut E) {
        for listener in self.listeners.values_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}
