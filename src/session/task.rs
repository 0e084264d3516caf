//! Background work owned by a mounted tab.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{
    sync::broadcast::error::RecvError,
    task::JoinHandle,
    time::{Instant, interval_at},
};

use crate::{
    api::{Credentials, LedgerApi},
    model::User,
    storage::{LocalStorage, USER_KEY},
    tabs::TabId,
};

use super::RootState;

/// The error recorded when the session could not be refreshed.
pub const REFRESH_ERROR: &str = "Unable to refresh session";

/// A spawned task that is aborted when the guard is dropped.
#[derive(Debug)]
pub struct BackgroundTask(JoinHandle<()>);

impl Drop for BackgroundTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Refresh the session once, recording [REFRESH_ERROR] on failure.
///
/// The user is kept either way.
pub async fn refresh_session(
    api: &dyn LedgerApi,
    credentials: &Mutex<Credentials>,
    state: &Mutex<RootState>,
) {
    let credentials = credentials
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    if let Err(error) = api.refresh_session(&credentials).await {
        tracing::warn!("Could not refresh session: {error}");
        state.lock().unwrap_or_else(PoisonError::into_inner).error = Some(REFRESH_ERROR.to_owned());
    }
}

/// Call [refresh_session] every `period`, starting one period from now.
pub fn spawn_session_refresh(
    api: Arc<dyn LedgerApi>,
    credentials: Arc<Mutex<Credentials>>,
    state: Arc<Mutex<RootState>>,
    period: Duration,
) -> BackgroundTask {
    let handle = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;
            refresh_session(api.as_ref(), &credentials, &state).await;
        }
    });

    BackgroundTask(handle)
}

/// Re-read the user from `storage` whenever another tab changes it.
///
/// The subscription is taken before the task is spawned so that no change
/// made after this call returns is missed.
pub fn spawn_storage_listener(
    tab_id: TabId,
    storage: Arc<dyn LocalStorage>,
    state: Arc<Mutex<RootState>>,
) -> BackgroundTask {
    let mut events = storage.subscribe();

    let handle = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if event.origin == tab_id || event.key != USER_KEY => continue,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Tab {tab_id} missed {skipped} storage event(s)");
                }
                Err(RecvError::Closed) => break,
            }

            let user = storage.get_item(USER_KEY).as_deref().and_then(User::from_json);
            tracing::debug!(
                "Tab {tab_id} picked up a session change, logged in: {}",
                user.is_some()
            );
            state.lock().unwrap_or_else(PoisonError::into_inner).user = user;
        }
    });

    BackgroundTask(handle)
}
