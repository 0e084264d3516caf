//! This file defines contacts and the friend-request relationship between the user and a contact.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

/// The ledger API's identifier for a contact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Create a contact ID from the ledger API's identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The contact ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Another user that the logged in user has exchanged friend requests with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    /// The contact's display name.
    pub name: String,
    /// The contact's email address.
    pub email: String,
    /// Whether the user has sent a friend request to the contact.
    pub sent: bool,
    /// Whether the contact has sent a friend request to the user.
    pub received: bool,
}

impl Contact {
    /// Derive the friend-request status from the `sent` and `received` flags.
    pub fn relationship(&self) -> Relationship {
        match (self.sent, self.received) {
            (true, true) => Relationship::Friends,
            (true, false) => Relationship::AwaitingResponse,
            (false, true) => Relationship::AwaitingUser,
            (false, false) => Relationship::None,
        }
    }

    /// Whether both users have sent each other a friend request.
    pub fn is_mutual(&self) -> bool {
        self.relationship() == Relationship::Friends
    }
}

/// The friend-request status between the user and a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// Both users sent a request.
    Friends,
    /// The user sent a request that the contact has not answered.
    AwaitingResponse,
    /// The contact sent a request that the user has not answered.
    AwaitingUser,
    /// Neither flag is set.
    None,
}

impl Relationship {
    /// The status text shown next to a contact, if any.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Relationship::Friends => Some("FRIENDS!"),
            Relationship::AwaitingResponse => Some("Waiting for response"),
            Relationship::AwaitingUser => Some("Respond to contact request"),
            Relationship::None => None,
        }
    }
}

/// The user's contacts keyed by contact ID, as returned by the ledger API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contacts(BTreeMap<ContactId, Contact>);

impl Contacts {
    /// Iterate over the contacts in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContactId, &Contact)> {
        self.0.iter()
    }

    /// Iterate over the contacts that are mutual friends of the user, in ID order.
    pub fn mutual(&self) -> impl Iterator<Item = (&ContactId, &Contact)> {
        self.0.iter().filter(|(_, contact)| contact.is_mutual())
    }

    /// Get a contact by ID.
    pub fn get(&self, id: &ContactId) -> Option<&Contact> {
        self.0.get(id)
    }

    /// The number of contacts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no contacts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ContactId, Contact)> for Contacts {
    fn from_iter<T: IntoIterator<Item = (ContactId, Contact)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod contact_tests {
    use serde_json::json;

    use super::{Contact, ContactId, Contacts, Relationship};

    #[test]
    fn relationship_labels() {
        let contacts: Contacts = serde_json::from_value(json!({
            "1": {"name": "A", "email": "a@example.com", "sent": true, "received": true},
            "2": {"name": "B", "email": "b@example.com", "sent": true, "received": false},
            "3": {"name": "C", "email": "c@example.com", "sent": false, "received": true},
            "4": {"name": "D", "email": "d@example.com", "sent": false, "received": false},
        }))
        .unwrap();

        let labels = contacts
            .iter()
            .map(|(id, contact)| (id.as_str(), contact.relationship().label()))
            .collect::<Vec<_>>();

        assert_eq!(
            labels,
            vec![
                ("1", Some("FRIENDS!")),
                ("2", Some("Waiting for response")),
                ("3", Some("Respond to contact request")),
                ("4", None),
            ]
        );
    }

    #[test]
    fn missing_fields_default() {
        let contact: Contact = serde_json::from_value(json!({"name": "A"})).unwrap();

        assert_eq!(contact.email, "");
        assert_eq!(contact.relationship(), Relationship::None);
    }

    #[test]
    fn mutual_only_yields_friends() {
        let contacts = Contacts::from_iter([
            (
                ContactId::new("1"),
                Contact {
                    name: "A".to_owned(),
                    sent: true,
                    received: true,
                    ..Default::default()
                },
            ),
            (
                ContactId::new("2"),
                Contact {
                    name: "B".to_owned(),
                    sent: true,
                    ..Default::default()
                },
            ),
        ]);

        let mutual = contacts.mutual().map(|(id, _)| id.clone()).collect::<Vec<_>>();

        assert_eq!(mutual, vec![ContactId::new("1")]);
    }
}
