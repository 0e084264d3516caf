//! This file defines transactions as listed by the ledger API and the draft
//! of a new expense-sharing transaction.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize, Serializer, ser::Error as _};
use serde_json::{Number, Value};
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::ContactId;

/// The user's transactions keyed by transaction ID.
///
/// Only the keys are displayed so the values are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions(BTreeMap<String, Value>);

impl Transactions {
    /// Iterate over the transaction IDs in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The number of transactions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no transactions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Transactions {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The amount was neither a whole number nor a number with one or two decimal places.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("\"{0}\" is not a valid amount, use a number with at most two decimal places")]
pub struct InvalidAmount(pub String);

/// A non-negative amount of money with at most two decimal places.
///
/// The text is kept exactly as the user typed it so that the amount input
/// shows what the user entered, e.g. "12.5" rather than "12.50".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount(String);

impl Amount {
    /// The amount a fresh draft starts with.
    pub fn draft_default() -> Self {
        Self("0.01".to_owned())
    }

    /// Parse user input as an amount.
    ///
    /// An empty string is read as zero.
    ///
    /// # Errors
    ///
    /// Returns [InvalidAmount] if `text` is not a string of ASCII digits,
    /// optionally followed by a dot and one or two more digits.
    pub fn parse(text: &str) -> Result<Self, InvalidAmount> {
        if text.is_empty() {
            return Ok(Self("0".to_owned()));
        }

        if is_decimal_with_two_places(text) {
            Ok(Self(text.to_owned()))
        } else {
            Err(InvalidAmount(text.to_owned()))
        }
    }

    /// The amount as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Amount {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// The ledger API reads the amount as a JSON number.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number = Number::from_str(&self.0).map_err(S::Error::custom)?;

        number.serialize(serializer)
    }
}

fn is_decimal_with_two_places(text: &str) -> bool {
    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());

    match text.split_once('.') {
        None => is_digits(text),
        Some((whole, fraction)) => is_digits(whole) && fraction.len() <= 2 && is_digits(fraction),
    }
}

/// A contact that shares in a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The contact's ID.
    pub id: ContactId,
    /// The contact's display name.
    pub name: String,
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The current time.
    pub fn now() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

/// A transaction that the user is filling in and has not submitted yet.
///
/// Serializes to the body of the ledger API's create transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionDraft {
    /// The total amount of the expense.
    pub amount: Amount,
    /// The contacts sharing the expense, without duplicates.
    pub participants: Vec<Participant>,
    /// When the draft was created. Editing the draft does not change it.
    pub timestamp: Timestamp,
}

impl TransactionDraft {
    /// An empty draft created at `timestamp`.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            amount: Amount::draft_default(),
            participants: Vec::new(),
            timestamp,
        }
    }
}
