//! This module defines the timing config for mounted tabs.

use std::time::Duration;

/// How often the ledger API session is refreshed, ten minutes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(600);
/// How long a tab may go without a request before it is unmounted.
pub const DEFAULT_TAB_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// How often idle tabs are looked for.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// How often a tab polls for session changes made by other tabs.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(10);

/// The config for the tabs mounted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// How often each tab refreshes the user's session with the ledger API.
    pub refresh_interval: Duration,
    /// How long a tab may go without a request before it is unmounted.
    pub tab_idle_timeout: Duration,
    /// How often the registry looks for idle tabs.
    pub sweep_interval: Duration,
    /// How often the browser polls a tab for session changes.
    pub sync_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            tab_idle_timeout: DEFAULT_TAB_IDLE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }
}
