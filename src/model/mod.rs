//! This module defines the domain data types shared by the session root and
//! the transaction form.

mod contact;
mod transaction;
mod user;

pub use contact::{Contact, ContactId, Contacts, Relationship};
pub use transaction::{Amount, InvalidAmount, Participant, Timestamp, TransactionDraft, Transactions};
pub use user::User;
