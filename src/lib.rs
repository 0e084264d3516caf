//! owed_rs is a web client for a peer ledger: "how much do I owe?".
//!
//! Users log in through the ledger API's OAuth flow, look up their contacts
//! and friend requests, list their transactions and split new expenses with
//! their friends.
//!
//! This library serves HTML pages and htmx fragments. It keeps the client
//! state of each open browser tab on the server and talks to the ledger API
//! on the user's behalf by forwarding the browser's session cookie.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;
use axum_server::Handle;
use tokio::signal;

mod api;
mod app_state;
mod client_cookie;
mod config;
mod endpoints;
mod html;
mod index_page;
mod logging;
mod model;
mod not_found;
mod routing;
mod session;
mod storage;
mod tab_endpoints;
mod tabs;
mod transaction_form;

#[cfg(test)]
mod test_utils;

pub use api::{ApiError, Credentials, HttpLedgerApi, LedgerApi};
pub use app_state::{AppState, create_cookie_key};
pub use config::ClientConfig;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use tabs::TabRegistry;

use crate::not_found::get_404_not_found_response;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur while serving the client.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The tab ID in the request does not refer to a mounted tab.
    ///
    /// Tabs are unmounted after a period of inactivity, so a browser that
    /// has been asleep for a while will hit this error on its next request.
    /// The client should reload the page to mount a new tab.
    #[error("the tab is not mounted")]
    TabNotFound,

    /// The tab ID in the request path could not be parsed.
    #[error("invalid tab ID \"{0}\"")]
    InvalidTabId(String),

    /// The request did not carry the client ID cookie.
    #[error("the client ID cookie is missing")]
    ClientCookieMissing,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            // htmx reloads the page on HX-Refresh, which mounts a fresh tab.
            Error::TabNotFound | Error::ClientCookieMissing => {
                tracing::debug!("Asking the browser to reload: {self}");
                (HxRefresh(true), StatusCode::OK).into_response()
            }
            Error::InvalidTabId(_) | Error::NotFound => get_404_not_found_response(),
        }
    }
}
