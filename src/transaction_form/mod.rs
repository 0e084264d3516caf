//! The form for splitting a new expense with the user's friends.

mod draft;
mod view;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use draft::{DraftFields, DraftPatch, apply_patch, participant_options, select_options};
pub use view::transaction_form_view;

use crate::{
    api::{Credentials, LedgerApi},
    model::{ContactId, Contacts, Participant, Timestamp, TransactionDraft},
};

/// The state of a [TransactionForm] at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// The transaction being filled in.
    pub draft: TransactionDraft,
    /// The contacts that can be picked as participants.
    pub options: Vec<Participant>,
    /// Whether the draft is being sent to the ledger API.
    pub submitting: bool,
    /// The last error, kept for logging only.
    pub error: Option<String>,
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The ledger API created the transaction.
    Created,
    /// The request failed and the error was recorded on the form.
    Failed,
}

/// The transaction form of one tab.
#[derive(Debug)]
pub struct TransactionForm {
    state: Mutex<FormState>,
}

impl TransactionForm {
    /// Create a form with a fresh draft and no participant options.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FormState {
                draft: TransactionDraft::new(Timestamp::now()),
                options: Vec::new(),
                submitting: false,
                error: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recompute the participant options from the root's contacts.
    pub fn set_contacts(&self, contacts: Option<&Contacts>) {
        self.lock().options = contacts.map(participant_options).unwrap_or_default();
    }

    /// Merge `patch` onto the draft.
    ///
    /// Returns `false` and leaves the draft unchanged if the patch was rejected.
    pub fn update(&self, patch: DraftPatch) -> bool {
        update_draft(&mut self.lock(), patch)
    }

    /// Replace the participants with the options matching `ids`.
    pub fn select_participants(&self, ids: &[ContactId]) -> bool {
        let mut state = self.lock();
        let participants = select_options(&state.options, ids);

        update_draft(&mut state, DraftPatch::participants(participants))
    }

    /// A copy of the current form state.
    pub fn snapshot(&self) -> FormState {
        self.lock().clone()
    }

    /// Merge the posted `fields` onto the draft, send the draft to the ledger
    /// API and reset it, whatever the outcome.
    ///
    /// Rejected fields are discarded and the previous draft is sent.
    pub async fn submit(
        &self,
        api: &dyn LedgerApi,
        credentials: &Credentials,
        fields: DraftFields,
    ) -> SubmitOutcome {
        let draft = {
            let mut state = self.lock();
            let patch = fields.into_patch(&state.options);
            update_draft(&mut state, patch);
            state.submitting = true;
            state.draft.clone()
        };

        let result = api.create_transaction(credentials, &draft).await;

        let mut state = self.lock();
        state.draft = TransactionDraft::new(Timestamp::now());
        state.submitting = false;

        match result {
            Ok(()) => {
                tracing::info!(
                    "Created transaction for {} with {} participant(s)",
                    draft.amount,
                    draft.participants.len()
                );
                SubmitOutcome::Created
            }
            Err(error) => {
                tracing::warn!("Could not create transaction: {error}");
                state.error = Some(error.to_string());
                SubmitOutcome::Failed
            }
        }
    }
}

fn update_draft(state: &mut FormState, patch: DraftPatch) -> bool {
    match apply_patch(&state.draft, patch) {
        Ok(draft) => {
            state.draft = draft;
            true
        }
        Err(error) => {
            tracing::debug!("Discarding draft update: {error}");
            false
        }
    }
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self::new()
    }
}
