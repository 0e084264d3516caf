use std::time::Duration;

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE,
        LINK_STYLE, LIST_ITEM_STYLE, PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    model::{Contact, ContactId, Contacts, Relationship, Transactions},
    session::RootState,
    tabs::TabId,
    transaction_form::{FormState, transaction_form_view},
};

/// The element ID of the app, which most tab endpoints swap.
pub const APP_ID: &str = "app";

/// The full page for a freshly mounted tab.
pub fn page_view(
    tab_id: TabId,
    state: &RootState,
    form: &FormState,
    sync_interval: Duration,
) -> Markup {
    base("Home", &app_view(tab_id, state, form, sync_interval))
}

/// The app element: the landing view when logged out, the ledger otherwise.
pub fn app_view(
    tab_id: TabId,
    state: &RootState,
    form: &FormState,
    sync_interval: Duration,
) -> Markup {
    let sync_route = format_endpoint(endpoints::TAB_SYNC, &[&tab_id.to_string()]);
    let sync_trigger = format!("every {}s", sync_interval.as_secs());

    html! {
        div id=(APP_ID) data-tab-id=(tab_id) class=(PAGE_CONTAINER_STYLE)
        {
            div
                hx-get=(sync_route)
                hx-trigger=(sync_trigger)
                hx-target={"#" (APP_ID)}
                hx-swap="outerHTML"
                {}

            @if state.user.is_some() {
                (ledger_view(tab_id, state, form))
            } @else {
                (landing_view())
            }
        }
    }
}

fn landing_view() -> Markup {
    html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-4xl font-bold mb-4" { "how much do i owe?" }

            p class="mb-6" { "A digital ledger to keep track of how much your friends owe you." }

            a href=(endpoints::LOG_IN) class=(LINK_STYLE) { "Login with Google" }
        }
    }
}

fn ledger_view(tab_id: TabId, state: &RootState, form: &FormState) -> Markup {
    let tab_id_text = tab_id.to_string();
    let contacts_route = format_endpoint(endpoints::TAB_CONTACTS, &[&tab_id_text]);
    let transactions_route = format_endpoint(endpoints::TAB_TRANSACTIONS, &[&tab_id_text]);
    let log_out_route = format_endpoint(endpoints::TAB_LOG_OUT, &[&tab_id_text]);
    let app_target = format!("#{APP_ID}");

    html! {
        div class="w-full max-w-md space-y-6"
        {
            div class="flex justify-between items-end"
            {
                h1 class="text-xl font-bold" { "how much do i owe?" }

                button
                    hx-post=(log_out_route)
                    class=(LINK_STYLE)
                {
                    "Log out"
                }
            }

            section
            {
                h2 class="text-lg font-semibold mb-2" { "Contacts" }

                @if let Some(contacts) = &state.contacts {
                    (contacts_view(tab_id, contacts))
                }

                button
                    hx-post=(contacts_route)
                    hx-target=(app_target)
                    hx-swap="outerHTML"
                    disabled[state.loading_contacts]
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    span class="htmx-indicator" { (loading_spinner()) }
                    "Get Contacts!"
                }
            }

            section
            {
                h2 class="text-lg font-semibold mb-2" { "Transactions" }

                @if let Some(transactions) = &state.transactions {
                    (transactions_view(transactions))
                }

                button
                    hx-post=(transactions_route)
                    hx-target=(app_target)
                    hx-swap="outerHTML"
                    disabled[state.loading_transactions]
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    span class="htmx-indicator" { (loading_spinner()) }
                    "Get Transactions!"
                }
            }

            section
            {
                h2 class="text-lg font-semibold mb-2" { "New Expense" }

                (transaction_form_view(tab_id, form))
            }
        }
    }
}

fn contacts_view(tab_id: TabId, contacts: &Contacts) -> Markup {
    html! {
        ul id="contacts" class="mb-2"
        {
            @if contacts.is_empty() {
                li class=(LIST_ITEM_STYLE) { "No contacts yet." }
            }

            @for (contact_id, contact) in contacts.iter() {
                (contact_item(tab_id, contact_id, contact))
            }
        }
    }
}

fn contact_item(tab_id: TabId, contact_id: &ContactId, contact: &Contact) -> Markup {
    let contact_route =
        format_endpoint(endpoints::TAB_CONTACT, &[&tab_id.to_string(), contact_id.as_str()]);
    let relationship = contact.relationship();

    html! {
        li class=(LIST_ITEM_STYLE) data-contact-id=(contact_id)
        {
            div class="flex justify-between items-center gap-4"
            {
                div
                {
                    p class="font-medium" { (contact.name) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (contact.email) }
                }

                div class="flex gap-4 items-center"
                {
                    @if let Some(label) = relationship.label() {
                        span class=(BADGE_STYLE) { (label) }
                    }

                    @if relationship == Relationship::AwaitingUser {
                        button
                            hx-put=(contact_route)
                            hx-target={"#" (APP_ID)}
                            hx-swap="outerHTML"
                            class=(LINK_STYLE)
                        {
                            "Accept"
                        }
                    }

                    button
                        hx-delete=(contact_route)
                        hx-confirm={"Are you sure you want to remove '" (contact.name) "'?"}
                        hx-target={"#" (APP_ID)}
                        hx-swap="outerHTML"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Remove"
                    }
                }
            }
        }
    }
}

fn transactions_view(transactions: &Transactions) -> Markup {
    html! {
        ul id="transactions" class="mb-2"
        {
            @if transactions.is_empty() {
                li class=(LIST_ITEM_STYLE) { "No transactions yet." }
            }

            @for key in transactions.keys() {
                li class=(LIST_ITEM_STYLE) { (key) }
            }
        }
    }
}
