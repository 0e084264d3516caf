//! The registry of mounted tabs and the local storage of each browser client.
//!
//! A browser client is one browser profile, identified by a private cookie.
//! Each page load mounts a new [SessionRoot] for that client as a tab. Tabs
//! of the same client share one [InMemoryStorage], the way browser tabs
//! share local storage.

use std::{
    collections::HashMap,
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::{task::JoinHandle, time::Instant};
use uuid::Uuid;

use crate::{Error, session::SessionRoot, storage::InMemoryStorage};

/// Identifies one mounted tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(Uuid);

impl TabId {
    /// Create a new random tab ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TabId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| Error::InvalidTabId(s.to_owned()))
    }
}

/// Identifies one browser client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Create a new random client ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ClientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

struct MountedTab {
    client_id: ClientId,
    root: Arc<SessionRoot>,
    last_seen: Instant,
}

#[derive(Default)]
struct Registry {
    tabs: HashMap<TabId, MountedTab>,
    storages: HashMap<ClientId, Arc<InMemoryStorage>>,
    /// The number of tabs of each client that are still mounting.
    reservations: HashMap<ClientId, usize>,
}

impl Registry {
    fn is_client_in_use(&self, client_id: ClientId) -> bool {
        self.reservations.contains_key(&client_id)
            || self.tabs.values().any(|tab| tab.client_id == client_id)
    }
}

/// A tab of one client that is being mounted.
///
/// The client's storage is kept while the reservation is alive, so a sweep
/// that runs before [TabReservation::insert] cannot split the client's tabs
/// across two storages.
pub struct TabReservation {
    registry: TabRegistry,
    client_id: ClientId,
    storage: Arc<InMemoryStorage>,
}

impl TabReservation {
    /// The local storage shared by the client's tabs.
    pub fn storage(&self) -> Arc<InMemoryStorage> {
        self.storage.clone()
    }

    /// Register the mounted tab and release the reservation.
    pub fn insert(self, root: Arc<SessionRoot>) {
        self.registry.insert(self.client_id, root);
    }
}

impl Drop for TabReservation {
    fn drop(&mut self) {
        let mut registry = self.registry.lock();

        if let Some(count) = registry.reservations.get_mut(&self.client_id) {
            *count -= 1;

            if *count == 0 {
                registry.reservations.remove(&self.client_id);
            }
        }

        if !registry.is_client_in_use(self.client_id) {
            registry.storages.remove(&self.client_id);
        }
    }
}

/// The tabs mounted by all browser clients.
#[derive(Clone, Default)]
pub struct TabRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl TabRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve a tab for `client_id` while it mounts.
    ///
    /// The client's local storage is created on first use.
    pub fn reserve(&self, client_id: ClientId) -> TabReservation {
        let storage = {
            let mut registry = self.lock();
            *registry.reservations.entry(client_id).or_default() += 1;

            registry
                .storages
                .entry(client_id)
                .or_insert_with(|| Arc::new(InMemoryStorage::new()))
                .clone()
        };

        TabReservation {
            registry: self.clone(),
            client_id,
            storage,
        }
    }

    fn insert(&self, client_id: ClientId, root: Arc<SessionRoot>) {
        let tab_id = root.tab_id();

        self.lock().tabs.insert(
            tab_id,
            MountedTab {
                client_id,
                root,
                last_seen: Instant::now(),
            },
        );
    }

    /// Get the tab `tab_id` of `client_id` and mark it as active.
    ///
    /// # Errors
    ///
    /// Returns [Error::TabNotFound] if the tab is not mounted or belongs to another client.
    pub fn get(&self, client_id: ClientId, tab_id: TabId) -> Result<Arc<SessionRoot>, Error> {
        let mut registry = self.lock();
        let tab = registry
            .tabs
            .get_mut(&tab_id)
            .filter(|tab| tab.client_id == client_id)
            .ok_or(Error::TabNotFound)?;

        tab.last_seen = Instant::now();

        Ok(tab.root.clone())
    }

    /// The number of mounted tabs.
    pub fn len(&self) -> usize {
        self.lock().tabs.len()
    }

    /// Whether no tabs are mounted.
    pub fn is_empty(&self) -> bool {
        self.lock().tabs.is_empty()
    }

    /// Unmount the tabs that have not been seen for `idle_timeout`.
    ///
    /// A client's storage is dropped together with its last tab, unless
    /// another tab of the client is still mounting. Returns the number of tabs unmounted.
    pub fn sweep(&self, idle_timeout: Duration) -> usize {
        let now = Instant::now();
        let idle_tabs = {
            let mut registry = self.lock();
            let idle_ids = registry
                .tabs
                .iter()
                .filter(|(_, tab)| now.duration_since(tab.last_seen) >= idle_timeout)
                .map(|(tab_id, _)| *tab_id)
                .collect::<Vec<_>>();

            let idle_tabs = idle_ids
                .iter()
                .filter_map(|tab_id| registry.tabs.remove(tab_id))
                .collect::<Vec<_>>();

            let unused_clients = registry
                .storages
                .keys()
                .copied()
                .filter(|client_id| !registry.is_client_in_use(*client_id))
                .collect::<Vec<_>>();

            for client_id in unused_clients {
                registry.storages.remove(&client_id);
            }

            idle_tabs
        };

        for tab in &idle_tabs {
            tracing::debug!("Unmounting idle tab {}", tab.root.tab_id());
            tab.root.unmount();
        }

        idle_tabs.len()
    }

    /// Spawn a task that calls [TabRegistry::sweep] every `sweep_interval`.
    pub fn spawn_sweeper(&self, sweep_interval: Duration, idle_timeout: Duration) -> JoinHandle<()> {
        let registry = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);

            loop {
                interval.tick().await;
                let unmounted = registry.sweep(idle_timeout);

                if unmounted > 0 {
                    tracing::info!("Unmounted {unmounted} idle tab(s)");
                }
            }
        })
    }
}
