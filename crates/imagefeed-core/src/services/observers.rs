//! Change notification registry.

use std::sync::{Arc, Mutex, Weak};

use crate::util::lock;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct ObserverList<E> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<E>)>,
}

/// Callbacks interested in events of type `E`.
///
/// Callbacks run on the notifying task after the service has released its
/// own state, so they may read the service freely.
pub struct Observers<E> {
    list: Arc<Mutex<ObserverList<E>>>,
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            list: Arc::new(Mutex::new(ObserverList {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }
}

impl<E: 'static> Observers<E> {
    /// Register `callback` until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut list = lock(&self.list);
            let id = list.next_id;
            list.next_id += 1;
            list.callbacks.push((id, Arc::new(callback)));
            id
        };

        let list: Weak<Mutex<ObserverList<E>>> = Arc::downgrade(&self.list);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(list) = list.upgrade() {
                    lock(&list).callbacks.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = lock(&self.list)
            .callbacks
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.list).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps an observer registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
