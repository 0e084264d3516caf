//! The ledger API as seen by the client.
//!
//! The session root and the transaction form only talk to the ledger API
//! through [LedgerApi], which keeps them testable without a network.

mod http;

use async_trait::async_trait;
use reqwest::StatusCode;

pub use http::HttpLedgerApi;

use crate::model::{ContactId, Contacts, TransactionDraft, Transactions, User};

/// The browser's credentials for the ledger API.
///
/// The ledger API keeps its session in a cookie on the browser, so the
/// client forwards the browser's `Cookie` header with every request it
/// makes on the user's behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    cookie: Option<String>,
}

impl Credentials {
    /// Credentials that forward the given `Cookie` header value.
    pub fn new(cookie: Option<String>) -> Self {
        Self { cookie }
    }

    /// The `Cookie` header value to forward, if the browser sent one.
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }
}

/// The ways a request to the ledger API can fail.
///
/// Callers only keep the error message; the variants exist for logging.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The ledger API answered with a status other than 2xx.
    #[error("request failed with status {0}")]
    Status(StatusCode),

    /// The response body was not the expected JSON.
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// The endpoints of the ledger API that the client uses.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Get the logged in user's account, `None` if the API returned a falsy body.
    async fn get_account(&self, credentials: &Credentials) -> Result<Option<User>, ApiError>;

    /// Extend the user's session. The response body is ignored.
    async fn refresh_session(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// Get the user's contacts.
    async fn get_contacts(&self, credentials: &Credentials) -> Result<Contacts, ApiError>;

    /// Send a friend request to `contact_id`, or accept theirs.
    ///
    /// Returns whether the two users are now mutual friends.
    async fn add_contact(
        &self,
        credentials: &Credentials,
        contact_id: &ContactId,
    ) -> Result<bool, ApiError>;

    /// Remove `contact_id` from the user's contacts in both directions.
    async fn remove_contact(
        &self,
        credentials: &Credentials,
        contact_id: &ContactId,
    ) -> Result<(), ApiError>;

    /// Get the user's transactions.
    async fn get_transactions(&self, credentials: &Credentials) -> Result<Transactions, ApiError>;

    /// Create a transaction from `draft`. The response body is ignored.
    async fn create_transaction(
        &self,
        credentials: &Credentials,
        draft: &TransactionDraft,
    ) -> Result<(), ApiError>;
}
