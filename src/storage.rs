//! Key/value storage shared by the tabs of one browser client.
//!
//! This plays the part of the browser's local storage: tabs persist the
//! session under [USER_KEY] and subscribe to hear about changes that other
//! tabs make to it.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use tokio::sync::broadcast;

use crate::tabs::TabId;

/// The storage key for the serialized logged in user.
pub const USER_KEY: &str = "user";

const EVENT_CAPACITY: usize = 16;

/// A change to one key of a [LocalStorage].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that was set or removed.
    pub key: String,
    /// The tab that made the change.
    pub origin: TabId,
}

/// Key/value storage with change notification.
///
/// Writes only notify subscribers when they change the stored value, and
/// each event records the tab that made the change so that a tab can skip
/// its own writes.
pub trait LocalStorage: Send + Sync {
    /// Get the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` on behalf of the tab `origin`.
    fn set_item(&self, key: &str, value: String, origin: TabId);

    /// Remove the value under `key` on behalf of the tab `origin`.
    fn remove_item(&self, key: &str, origin: TabId);

    /// Subscribe to changes made from now on.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// A [LocalStorage] that lives in memory for as long as the browser client has open tabs.
#[derive(Debug)]
pub struct InMemoryStorage {
    items: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl InMemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            items: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn notify(&self, key: &str, origin: TabId) {
        // Sending fails when nobody is subscribed, which is fine.
        let _ = self.events.send(StorageEvent {
            key: key.to_owned(),
            origin,
        });
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorage for InMemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: String, origin: TabId) {
        let previous = self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.clone());

        if previous.as_ref() != Some(&value) {
            self.notify(key, origin);
        }
    }

    fn remove_item(&self, key: &str, origin: TabId) {
        let previous = self
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        if previous.is_some() {
            self.notify(key, origin);
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
