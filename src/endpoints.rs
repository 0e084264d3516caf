//! The endpoint URIs served by this client and the ledger API endpoints it calls.
//!
//! For endpoints that take a parameter, e.g., '/tabs/{tab_id}/contacts', use [format_endpoint].

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// The root route which mounts a new tab and renders the app.
pub const ROOT: &str = "/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for fetching the user's contacts into a tab.
pub const TAB_CONTACTS: &str = "/tabs/{tab_id}/contacts";
/// The route for accepting (PUT) or removing (DELETE) a contact.
pub const TAB_CONTACT: &str = "/tabs/{tab_id}/contacts/{contact_id}";
/// The route for fetching the user's transactions into a tab.
pub const TAB_TRANSACTIONS: &str = "/tabs/{tab_id}/transactions";
/// The route for changing the amount of the transaction draft.
pub const TAB_DRAFT_AMOUNT: &str = "/tabs/{tab_id}/draft/amount";
/// The route for changing the participants of the transaction draft.
pub const TAB_DRAFT_PARTICIPANTS: &str = "/tabs/{tab_id}/draft/participants";
/// The route for submitting the transaction draft.
pub const TAB_DRAFT_SUBMIT: &str = "/tabs/{tab_id}/draft/submit";
/// The route polled by a tab to pick up session changes made elsewhere.
pub const TAB_SYNC: &str = "/tabs/{tab_id}/sync";
/// The route for logging out from a tab.
pub const TAB_LOG_OUT: &str = "/tabs/{tab_id}/log_out";

/// The ledger API route that starts the OAuth log in flow.
pub const LOG_IN: &str = "/oauth/v1/login";
/// The ledger API route that ends the user's session.
pub const LOG_OUT: &str = "/oauth/v1/logout";
/// The ledger API route for the logged in user's account.
pub const ACCOUNT_API: &str = "/oauth/v1/account";
/// The ledger API route for extending the user's session.
pub const REFRESH_API: &str = "/oauth/v1/refresh";
/// The ledger API route for listing contacts.
pub const CONTACTS_API: &str = "/api/v1/contacts";
/// The ledger API route for a single contact, the contact ID is appended as a path segment.
pub const CONTACT_API: &str = "/api/v1/contact";
/// The ledger API route for listing transactions.
pub const TRANSACTIONS_API: &str = "/api/v1/transactions";
/// The ledger API route for creating a transaction.
pub const TRANSACTION_API: &str = "/api/v1/transaction";

/// The characters that must be escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Replace the parameters in `endpoint_path` with `values`, in order.
///
/// Values are percent-encoded as path segments.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/tabs/{tab_id}/sync', '{tab_id}' is the parameter.
///
/// Parameters without a matching value are left in place.
pub fn format_endpoint(endpoint_path: &str, values: &[&str]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut values = values.iter();
    let mut rest = endpoint_path;

    while let Some(param_start) = rest.find('{') {
        let Some(param_length) = rest[param_start..].find('}') else {
            break;
        };
        let param_end = param_start + param_length + 1;

        formatted.push_str(&rest[..param_start]);
        match values.next() {
            Some(value) => formatted.extend(utf8_percent_encode(value, PATH_SEGMENT)),
            None => formatted.push_str(&rest[param_start..param_end]),
        }

        rest = &rest[param_end..];
    }

    formatted.push_str(rest);
    formatted
}
