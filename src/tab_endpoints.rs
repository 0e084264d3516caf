//! Route handlers for the actions a user takes in a mounted tab.
//!
//! Every route is nested under the tab's ID. The [ActiveTab] extractor looks
//! the tab up for the requesting browser client, so a tab can only be driven
//! by the browser that mounted it.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::{HeaderMap, StatusCode, header::COOKIE, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    Form, PrivateCookieJar,
    cookie::Key,
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState, Error,
    api::Credentials,
    client_cookie::{COOKIE_CLIENT_ID, get_client_id},
    endpoints,
    model::ContactId,
    session::SessionRoot,
    tabs::TabId,
    transaction_form::{DraftFields, DraftPatch, transaction_form_view},
};

/// The mounted tab named in the request path.
pub struct ActiveTab(pub Arc<SessionRoot>);

impl FromRequestParts<AppState> for ActiveTab {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::NotFound)?;
        let tab_id: TabId = params.get("tab_id").ok_or(Error::NotFound)?.parse()?;

        let jar = PrivateCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        let client_id = get_client_id(&jar)?;

        let root = state.tabs.get(client_id, tab_id)?;
        root.set_credentials(forwarded_credentials(&parts.headers));

        Ok(Self(root))
    }
}

/// The browser's cookies for the ledger API, without the client's own cookie.
pub(crate) fn forwarded_credentials(headers: &HeaderMap) -> Credentials {
    let client_cookie_prefix = format!("{COOKIE_CLIENT_ID}=");

    let cookies = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|cookie| !cookie.is_empty() && !cookie.starts_with(&client_cookie_prefix))
        .collect::<Vec<_>>();

    if cookies.is_empty() {
        Credentials::default()
    } else {
        Credentials::new(Some(cookies.join("; ")))
    }
}

/// Fetch the user's contacts and re-render the app.
pub async fn get_contacts_endpoint(ActiveTab(root): ActiveTab) -> Response {
    root.get_contacts().await;

    root.render_app().into_response()
}

/// Accept a contact request and re-render the app.
pub async fn accept_contact_endpoint(
    ActiveTab(root): ActiveTab,
    Path((_, contact_id)): Path<(String, String)>,
) -> Response {
    root.accept_contact(&ContactId::new(contact_id)).await;

    root.render_app().into_response()
}

/// Remove a contact and re-render the app.
pub async fn remove_contact_endpoint(
    ActiveTab(root): ActiveTab,
    Path((_, contact_id)): Path<(String, String)>,
) -> Response {
    root.remove_contact(&ContactId::new(contact_id)).await;

    root.render_app().into_response()
}

/// Fetch the user's transactions and re-render the app.
pub async fn get_transactions_endpoint(ActiveTab(root): ActiveTab) -> Response {
    root.get_transactions().await;

    root.render_app().into_response()
}

/// The form data for changing the draft amount.
#[derive(Debug, Deserialize)]
pub struct AmountForm {
    /// The amount as typed by the user.
    #[serde(default)]
    pub amount: String,
}

/// Change the draft amount and re-render the form.
///
/// An invalid amount is discarded and the form shows the previous amount.
pub async fn update_amount_endpoint(
    ActiveTab(root): ActiveTab,
    Form(form): Form<AmountForm>,
) -> Response {
    root.form().update(DraftPatch::amount(form.amount));

    transaction_form_view(root.tab_id(), &root.form().snapshot()).into_response()
}

/// The form data for changing the draft participants.
#[derive(Debug, Deserialize)]
pub struct ParticipantsForm {
    /// The IDs of the selected contacts. Browsers omit the field when nothing is selected.
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Change the draft participants and re-render the form.
pub async fn update_participants_endpoint(
    ActiveTab(root): ActiveTab,
    Form(form): Form<ParticipantsForm>,
) -> Response {
    let ids = form
        .participants
        .into_iter()
        .map(ContactId::new)
        .collect::<Vec<_>>();
    root.form().select_participants(&ids);

    transaction_form_view(root.tab_id(), &root.form().snapshot()).into_response()
}

/// The form data posted with the whole transaction form.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    /// The amount as typed by the user.
    #[serde(default)]
    pub amount: Option<String>,
    /// The IDs of the selected contacts.
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Submit the draft and re-render the app.
///
/// The posted fields are merged onto the draft first, so a change that has
/// not reached [update_amount_endpoint] yet is still sent.
pub async fn submit_transaction_endpoint(
    ActiveTab(root): ActiveTab,
    Form(form): Form<SubmitForm>,
) -> Response {
    let fields = DraftFields {
        amount: form.amount,
        participants: Some(form.participants.into_iter().map(ContactId::new).collect()),
    };
    root.submit_transaction(fields).await;

    root.render_app().into_response()
}

/// Re-render the app if another tab logged in or out, otherwise do nothing.
pub async fn sync_endpoint(ActiveTab(root): ActiveTab) -> Response {
    match root.sync() {
        Some(app) => app.into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Log out of every tab and hand over to the ledger API's log out flow.
pub async fn log_out_endpoint(ActiveTab(root): ActiveTab) -> Response {
    root.log_out();
    tracing::info!("Logged out from tab {}", root.tab_id());

    (HxRedirect(endpoints::LOG_OUT.to_owned()), StatusCode::OK).into_response()
}

#[cfg(test)]
mod forwarded_credentials_tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    use crate::api::Credentials;

    use super::forwarded_credentials;

    #[test]
    fn forwards_cookies_except_client_id() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("session=abc; client_id=xyz"));
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));

        let got = forwarded_credentials(&headers);

        assert_eq!(got, Credentials::new(Some("session=abc; theme=dark".to_owned())));
    }

    #[test]
    fn no_cookies_means_no_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("client_id=xyz"));

        assert_eq!(forwarded_credentials(&headers), Credentials::default());
        assert_eq!(forwarded_credentials(&HeaderMap::new()), Credentials::default());
    }
}
