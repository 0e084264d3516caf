use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;

use crate::{
    api::{ApiError, Credentials, LedgerApi},
    model::{ContactId, Contacts, TransactionDraft, Transactions, User},
};

/// A call made to [FakeLedgerApi].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    GetAccount,
    RefreshSession,
    GetContacts,
    AddContact(ContactId),
    RemoveContact(ContactId),
    GetTransactions,
    CreateTransaction,
}

#[derive(Debug, Default)]
struct Calls {
    calls: Vec<ApiCall>,
    credentials: Vec<Credentials>,
    created: Vec<TransactionDraft>,
}

/// A [LedgerApi] that answers with canned responses and records its calls.
///
/// By default the user is logged in as "Alice" and has no contacts or transactions.
#[derive(Debug)]
pub(crate) struct FakeLedgerApi {
    account: Result<Option<User>, ApiError>,
    refresh: Result<(), ApiError>,
    contacts: Result<Contacts, ApiError>,
    add_contact: Result<bool, ApiError>,
    remove_contact: Result<(), ApiError>,
    transactions: Result<Transactions, ApiError>,
    create_transaction: Result<(), ApiError>,
    delay: Option<Duration>,
    calls: Mutex<Calls>,
}

impl FakeLedgerApi {
    pub(crate) fn new() -> Self {
        Self {
            account: Ok(User::from_value(json!({"id": "alice", "name": "Alice"}))),
            refresh: Ok(()),
            contacts: Ok(Contacts::default()),
            add_contact: Ok(true),
            remove_contact: Ok(()),
            transactions: Ok(Transactions::default()),
            create_transaction: Ok(()),
            delay: None,
            calls: Mutex::default(),
        }
    }

    pub(crate) fn with_account(mut self, account: Result<Option<User>, ApiError>) -> Self {
        self.account = account;
        self
    }

    pub(crate) fn with_refresh(mut self, refresh: Result<(), ApiError>) -> Self {
        self.refresh = refresh;
        self
    }

    pub(crate) fn with_contacts(mut self, contacts: Result<Contacts, ApiError>) -> Self {
        self.contacts = contacts;
        self
    }

    pub(crate) fn with_remove_contact(mut self, remove_contact: Result<(), ApiError>) -> Self {
        self.remove_contact = remove_contact;
        self
    }

    pub(crate) fn with_transactions(mut self, transactions: Result<Transactions, ApiError>) -> Self {
        self.transactions = transactions;
        self
    }

    pub(crate) fn with_create_transaction(
        mut self,
        create_transaction: Result<(), ApiError>,
    ) -> Self {
        self.create_transaction = create_transaction;
        self
    }

    /// Make every call wait for `delay` before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn record(&self, call: ApiCall, credentials: &Credentials) {
        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.calls.push(call);
            calls.credentials.push(credentials.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// Every call made so far, in order.
    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().calls.clone()
    }

    /// How many times `call` was made.
    pub(crate) fn count(&self, call: &ApiCall) -> usize {
        self.calls().iter().filter(|made| *made == call).count()
    }

    /// The credentials passed with each call, in order.
    pub(crate) fn credentials(&self) -> Vec<Credentials> {
        self.calls.lock().unwrap().credentials.clone()
    }

    /// The drafts passed to `create_transaction`.
    pub(crate) fn created_transactions(&self) -> Vec<TransactionDraft> {
        self.calls.lock().unwrap().created.clone()
    }
}

#[async_trait]
impl LedgerApi for FakeLedgerApi {
    async fn get_account(&self, credentials: &Credentials) -> Result<Option<User>, ApiError> {
        self.record(ApiCall::GetAccount, credentials).await;
        self.account.clone()
    }

    async fn refresh_session(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.record(ApiCall::RefreshSession, credentials).await;
        self.refresh.clone()
    }

    async fn get_contacts(&self, credentials: &Credentials) -> Result<Contacts, ApiError> {
        self.record(ApiCall::GetContacts, credentials).await;
        self.contacts.clone()
    }

    async fn add_contact(
        &self,
        credentials: &Credentials,
        contact_id: &ContactId,
    ) -> Result<bool, ApiError> {
        self.record(ApiCall::AddContact(contact_id.clone()), credentials).await;
        self.add_contact.clone()
    }

    async fn remove_contact(
        &self,
        credentials: &Credentials,
        contact_id: &ContactId,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::RemoveContact(contact_id.clone()), credentials).await;
        self.remove_contact.clone()
    }

    async fn get_transactions(&self, credentials: &Credentials) -> Result<Transactions, ApiError> {
        self.record(ApiCall::GetTransactions, credentials).await;
        self.transactions.clone()
    }

    async fn create_transaction(
        &self,
        credentials: &Credentials,
        draft: &TransactionDraft,
    ) -> Result<(), ApiError> {
        self.record(ApiCall::CreateTransaction, credentials).await;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .created
            .push(draft.clone());
        self.create_transaction.clone()
    }
}
