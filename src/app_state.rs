//! Implements a struct that holds the state of the client server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{api::LedgerApi, config::ClientConfig, tabs::TabRegistry};

/// The state of the client server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The ledger API that mounted tabs talk to.
    pub api: Arc<dyn LedgerApi>,

    /// The mounted tabs of every browser client.
    pub tabs: TabRegistry,

    /// The timing config for mounted tabs.
    pub client_config: ClientConfig,
}

impl AppState {
    /// Create a new [AppState] with no mounted tabs.
    pub fn new(cookie_secret: &str, api: Arc<dyn LedgerApi>, client_config: ClientConfig) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            api,
            tabs: TabRegistry::new(),
            client_config,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
