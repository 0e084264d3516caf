use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
    tabs::TabId,
    transaction_form::FormState,
};

/// The element ID that the draft endpoints swap.
pub const TRANSACTION_FORM_ID: &str = "transaction-form";

/// Render the transaction form of the tab `tab_id`.
///
/// Changing the participants or the amount posts just that field and swaps
/// the form with the server's copy, so a rejected amount snaps back to the
/// last valid value. Submitting posts every field, and aborts a field's
/// update that is still in flight.
pub fn transaction_form_view(tab_id: TabId, state: &FormState) -> Markup {
    let tab_id = tab_id.to_string();
    let submit_route = format_endpoint(endpoints::TAB_DRAFT_SUBMIT, &[&tab_id]);
    let amount_route = format_endpoint(endpoints::TAB_DRAFT_AMOUNT, &[&tab_id]);
    let participants_route = format_endpoint(endpoints::TAB_DRAFT_PARTICIPANTS, &[&tab_id]);
    let form_target = format!("#{TRANSACTION_FORM_ID}");

    html! {
        form
            id=(TRANSACTION_FORM_ID)
            hx-post=(submit_route)
            hx-target="#app"
            hx-swap="outerHTML"
            hx-disabled-elt="find button"
            class="w-full space-y-4"
        {
            div
            {
                label for="participants" class=(FORM_LABEL_STYLE) { "Split with" }

                select
                    id="participants"
                    name="participants"
                    multiple
                    hx-post=(participants_route)
                    hx-trigger="change"
                    hx-target=(form_target)
                    hx-swap="outerHTML"
                    hx-params="participants"
                    hx-sync="closest form:abort"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for choice in &state.options {
                        @let is_selected = state
                            .draft
                            .participants
                            .iter()
                            .any(|participant| participant.id == choice.id);

                        option value=(choice.id) selected[is_selected] { (choice.name) }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    id="amount"
                    name="amount"
                    type="text"
                    inputmode="decimal"
                    value=(state.draft.amount)
                    hx-post=(amount_route)
                    hx-trigger="change"
                    hx-target=(form_target)
                    hx-swap="outerHTML"
                    hx-params="amount"
                    hx-sync="closest form:abort"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) disabled[state.submitting]
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Create Expense"
            }
        }
    }
}
