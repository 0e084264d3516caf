//! The merge-reducer for the transaction draft and the participant options.

use crate::model::{
    Amount, ContactId, Contacts, InvalidAmount, Participant, TransactionDraft,
};

/// A partial update to a [TransactionDraft].
///
/// Fields set to `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    /// The amount as typed by the user.
    pub amount: Option<String>,
    /// The new list of participants, replacing the current one.
    pub participants: Option<Vec<Participant>>,
}

impl DraftPatch {
    /// A patch that only changes the amount.
    pub fn amount(amount: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            ..Default::default()
        }
    }

    /// A patch that only changes the participants.
    pub fn participants(participants: Vec<Participant>) -> Self {
        Self {
            participants: Some(participants),
            ..Default::default()
        }
    }
}

/// The draft fields as the browser posts them, before the participant IDs
/// are looked up in the options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    /// The amount as typed by the user.
    pub amount: Option<String>,
    /// The IDs of the selected participants.
    pub participants: Option<Vec<ContactId>>,
}

impl DraftFields {
    /// The patch for these fields, keeping only the participants found in `options`.
    pub fn into_patch(self, options: &[Participant]) -> DraftPatch {
        DraftPatch {
            amount: self.amount,
            participants: self
                .participants
                .map(|ids| select_options(options, &ids)),
        }
    }
}

/// Merge `patch` onto `previous`.
///
/// The patch is applied as a whole or not at all: if the merged amount is
/// invalid, the participants in the same patch are discarded too.
/// Participants are de-duplicated by ID, keeping the first occurrence.
///
/// # Errors
///
/// Returns [InvalidAmount] if the patched amount is not a valid amount.
pub fn apply_patch(
    previous: &TransactionDraft,
    patch: DraftPatch,
) -> Result<TransactionDraft, InvalidAmount> {
    let amount = match patch.amount {
        Some(text) => Amount::parse(&text)?,
        None => previous.amount.clone(),
    };

    let participants = match patch.participants {
        Some(participants) => dedup_participants(participants),
        None => previous.participants.clone(),
    };

    Ok(TransactionDraft {
        amount,
        participants,
        timestamp: previous.timestamp,
    })
}

fn dedup_participants(participants: Vec<Participant>) -> Vec<Participant> {
    let mut unique: Vec<Participant> = Vec::with_capacity(participants.len());

    for participant in participants {
        if !unique.iter().any(|existing| existing.id == participant.id) {
            unique.push(participant);
        }
    }

    unique
}

/// The contacts that can share a transaction: mutual friends only.
pub fn participant_options(contacts: &Contacts) -> Vec<Participant> {
    contacts
        .mutual()
        .map(|(id, contact)| Participant {
            id: id.clone(),
            name: contact.name.clone(),
        })
        .collect()
}

/// Look up `ids` in `options`, keeping the order of `ids` and dropping unknown IDs.
pub fn select_options(options: &[Participant], ids: &[ContactId]) -> Vec<Participant> {
    ids.iter()
        .filter_map(|id| options.iter().find(|option| option.id == *id))
        .cloned()
        .collect()
}
