//! The root page, which mounts a new tab for every page load.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    AppState, client_cookie::get_or_create_client_id, session::SessionRoot,
    tab_endpoints::forwarded_credentials, tabs::TabId,
};

/// Mount a tab for the requesting browser and render the page.
pub async fn get_index_page(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
) -> Response {
    let (jar, client_id) = get_or_create_client_id(jar);
    let reservation = state.tabs.reserve(client_id);

    let root = SessionRoot::mount(
        TabId::new(),
        state.api.clone(),
        reservation.storage(),
        forwarded_credentials(&headers),
        &state.client_config,
    )
    .await;
    let root = Arc::new(root);
    reservation.insert(root.clone());
    tracing::debug!("Mounted tab {} for client {client_id}", root.tab_id());

    (jar, root.render_page()).into_response()
}
