//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    index_page::get_index_page,
    not_found::get_404_not_found,
    tab_endpoints::{
        accept_contact_endpoint, get_contacts_endpoint, get_transactions_endpoint,
        log_out_endpoint, remove_contact_endpoint, submit_transaction_endpoint, sync_endpoint,
        update_amount_endpoint, update_participants_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let tab_routes = Router::new()
        .route(endpoints::TAB_CONTACTS, post(get_contacts_endpoint))
        .route(
            endpoints::TAB_CONTACT,
            put(accept_contact_endpoint).delete(remove_contact_endpoint),
        )
        .route(endpoints::TAB_TRANSACTIONS, post(get_transactions_endpoint))
        .route(endpoints::TAB_DRAFT_AMOUNT, post(update_amount_endpoint))
        .route(
            endpoints::TAB_DRAFT_PARTICIPANTS,
            post(update_participants_endpoint),
        )
        .route(endpoints::TAB_DRAFT_SUBMIT, post(submit_transaction_endpoint))
        .route(endpoints::TAB_SYNC, get(sync_endpoint))
        .route(endpoints::TAB_LOG_OUT, post(log_out_endpoint));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .merge(tab_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
