//! Observable value with explicit subscribe/unsubscribe.
//!
//! Used for state that several parts of an application read: the selected
//! structure, the loader's state. Subscribers run synchronously inside
//! [`Store::set`], only when the value actually changes.

use crate::structure::StructureId;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

/// A value plus the callbacks interested in its changes.
pub struct Store<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

/// The structure the user has selected, if any.
pub type SelectionStore = Store<Option<StructureId>>;

impl<T: Default + PartialEq> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T: PartialEq> Store<T> {
    /// Store holding `value` with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value. Subscribers are notified, in subscription
    /// order, only if it changed. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.value);
        }
        true
    }

    /// Register a callback for future changes.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&T) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
