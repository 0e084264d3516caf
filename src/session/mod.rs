//! The root component of a tab: the user's session and what they have loaded.
//!
//! A [SessionRoot] is mounted for every page load. It bootstraps the user
//! from local storage, checks the session with the ledger API, keeps the
//! session alive with a periodic refresh and follows log ins and log outs
//! made in other tabs of the same browser. Contacts and transactions are
//! only fetched when the user asks for them.

mod task;
mod view;

use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use maud::Markup;

pub use view::APP_ID;

use crate::{
    api::{ApiError, Credentials, LedgerApi},
    config::ClientConfig,
    model::{ContactId, Contacts, Transactions, User},
    storage::{LocalStorage, USER_KEY},
    tabs::TabId,
    transaction_form::{DraftFields, SubmitOutcome, TransactionForm},
};

use task::{BackgroundTask, spawn_session_refresh, spawn_storage_listener};
use view::{app_view, page_view};

/// The state owned by a [SessionRoot].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    /// The logged in user, `None` when logged out.
    pub user: Option<User>,
    /// The user's contacts, `None` until fetched or after a failed fetch.
    pub contacts: Option<Contacts>,
    /// The user's transactions, `None` until fetched or after a failed fetch.
    pub transactions: Option<Transactions>,
    /// Whether contacts are being fetched.
    pub loading_contacts: bool,
    /// Whether transactions are being fetched.
    pub loading_transactions: bool,
    /// The last error, kept for logging only.
    pub error: Option<String>,
}

/// The root component of one mounted tab.
pub struct SessionRoot {
    tab_id: TabId,
    api: Arc<dyn LedgerApi>,
    storage: Arc<dyn LocalStorage>,
    credentials: Arc<Mutex<Credentials>>,
    state: Arc<Mutex<RootState>>,
    form: TransactionForm,
    sync_interval: Duration,
    /// Whether the browser last got the logged in view.
    rendered_signed_in: AtomicBool,
    tasks: Mutex<Vec<BackgroundTask>>,
    unmounted: AtomicBool,
}

impl SessionRoot {
    /// Mount a tab: start its background tasks and check the session.
    ///
    /// The user persisted in `storage` is loaded first and then replaced by
    /// the result of the account request.
    pub async fn mount(
        tab_id: TabId,
        api: Arc<dyn LedgerApi>,
        storage: Arc<dyn LocalStorage>,
        credentials: Credentials,
        config: &ClientConfig,
    ) -> Self {
        let state = RootState {
            user: storage.get_item(USER_KEY).as_deref().and_then(User::from_json),
            ..Default::default()
        };
        let state = Arc::new(Mutex::new(state));
        let credentials = Arc::new(Mutex::new(credentials));

        let tasks = vec![
            spawn_session_refresh(
                api.clone(),
                credentials.clone(),
                state.clone(),
                config.refresh_interval,
            ),
            spawn_storage_listener(tab_id, storage.clone(), state.clone()),
        ];

        let root = Self {
            tab_id,
            api,
            storage,
            credentials,
            state,
            form: TransactionForm::new(),
            sync_interval: config.sync_interval,
            rendered_signed_in: AtomicBool::new(false),
            tasks: Mutex::new(tasks),
            unmounted: AtomicBool::new(false),
        };

        root.load_account().await;

        root
    }

    /// The ID of this tab.
    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    fn lock(&self) -> MutexGuard<'_, RootState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn credentials(&self) -> Credentials {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Use the browser's latest cookies for ledger API requests.
    pub fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.lock().unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// A copy of the current state.
    pub fn state(&self) -> RootState {
        self.lock().clone()
    }

    /// The tab's transaction form.
    pub fn form(&self) -> &TransactionForm {
        &self.form
    }

    fn record_error(&self, context: &str, error: &ApiError) {
        tracing::warn!("Tab {}: {context}: {error}", self.tab_id);
        self.lock().error = Some(error.to_string());
    }

    async fn load_account(&self) {
        let result = self.api.get_account(&self.credentials()).await;

        match result {
            Ok(Some(user)) => {
                self.storage
                    .set_item(USER_KEY, user.to_json(), self.tab_id);
                self.lock().user = Some(user);
            }
            Ok(None) => {
                self.storage.remove_item(USER_KEY, self.tab_id);
                self.lock().user = None;
            }
            Err(error) => {
                self.storage.remove_item(USER_KEY, self.tab_id);
                self.lock().user = None;
                self.record_error("Could not get account", &error);
            }
        }
    }

    /// Fetch the user's contacts, replacing the loaded ones.
    pub async fn get_contacts(&self) {
        self.lock().loading_contacts = true;

        let result = self.api.get_contacts(&self.credentials()).await;

        let contacts = {
            let mut state = self.lock();
            state.loading_contacts = false;
            state.contacts = result.as_ref().ok().cloned();
            state.contacts.clone()
        };
        self.form.set_contacts(contacts.as_ref());

        if let Err(error) = result {
            self.record_error("Could not get contacts", &error);
        }
    }

    /// Fetch the user's transactions, replacing the loaded ones.
    pub async fn get_transactions(&self) {
        self.lock().loading_transactions = true;

        let result = self.api.get_transactions(&self.credentials()).await;

        {
            let mut state = self.lock();
            state.loading_transactions = false;
            state.transactions = result.as_ref().ok().cloned();
        }

        if let Err(error) = result {
            self.record_error("Could not get transactions", &error);
        }
    }

    /// Accept the friend request from `contact_id` and reload the contacts.
    pub async fn accept_contact(&self, contact_id: &ContactId) {
        match self.api.add_contact(&self.credentials(), contact_id).await {
            Ok(is_mutual) => {
                tracing::info!("Added contact {contact_id}, mutual: {is_mutual}");
                self.get_contacts().await;
            }
            Err(error) => self.record_error("Could not add contact", &error),
        }
    }

    /// Remove `contact_id` from the user's contacts and reload the contacts.
    pub async fn remove_contact(&self, contact_id: &ContactId) {
        match self.api.remove_contact(&self.credentials(), contact_id).await {
            Ok(()) => {
                tracing::info!("Removed contact {contact_id}");
                self.get_contacts().await;
            }
            Err(error) => self.record_error("Could not remove contact", &error),
        }
    }

    /// Submit the transaction form with the fields the browser posted.
    ///
    /// A successful submission reloads the transactions if they were loaded.
    pub async fn submit_transaction(&self, fields: DraftFields) -> SubmitOutcome {
        let outcome = self
            .form
            .submit(self.api.as_ref(), &self.credentials(), fields)
            .await;

        let has_transactions = self.lock().transactions.is_some();
        if outcome == SubmitOutcome::Created && has_transactions {
            self.get_transactions().await;
        }

        outcome
    }

    /// Forget the user in this tab and in every other tab of the browser.
    pub fn log_out(&self) {
        {
            let mut state = self.lock();
            state.user = None;
            state.contacts = None;
            state.transactions = None;
        }
        self.form.set_contacts(None);
        self.storage.remove_item(USER_KEY, self.tab_id);
    }

    /// Stop the tab's background tasks.
    pub fn unmount(&self) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.unmounted.store(true, Ordering::Relaxed);
    }

    /// Whether [SessionRoot::unmount] has been called.
    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::Relaxed)
    }

    /// Re-render the app if the user logged in or out since the browser last got it.
    pub fn sync(&self) -> Option<Markup> {
        let is_signed_in = self.lock().user.is_some();

        (is_signed_in != self.rendered_signed_in.load(Ordering::Relaxed))
            .then(|| self.render_app())
    }

    /// Render the whole page.
    pub fn render_page(&self) -> Markup {
        let state = self.state();
        self.rendered_signed_in
            .store(state.user.is_some(), Ordering::Relaxed);

        page_view(self.tab_id, &state, &self.form.snapshot(), self.sync_interval)
    }

    /// Render the app element, for swapping into the page.
    pub fn render_app(&self) -> Markup {
        let state = self.state();
        self.rendered_signed_in
            .store(state.user.is_some(), Ordering::Relaxed);

        app_view(self.tab_id, &state, &self.form.snapshot(), self.sync_interval)
    }
}
