use std::{
    env,
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use reqwest::Url;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use axum::middleware;
#[cfg(debug_assertions)]
use owed_rs::logging_middleware;
#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use owed_rs::{AppState, ClientConfig, HttpLedgerApi, build_router, graceful_shutdown};

/// The web client for the "how much do i owe?" ledger.
///
/// Serve this behind the same origin as the ledger API so that the browser's
/// session cookie reaches both.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the ledger API, e.g. "http://127.0.0.1:8080".
    #[arg(long)]
    api_url: Url,

    /// The port to serve the client from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// How often each tab refreshes the user's session, in seconds.
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    refresh_interval_secs: u64,

    /// How long a tab may go without a request before it is unmounted, in seconds.
    #[arg(long, default_value_t = 1800, value_parser = clap::value_parser!(u64).range(1..))]
    tab_idle_timeout_secs: u64,

    /// How often the browser polls a tab for log ins and log outs in other tabs, in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    sync_interval_secs: u64,

    /// How long to wait for the ledger API before giving up on a request, in seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    request_timeout_secs: u64,

    /// The file to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let api = HttpLedgerApi::new(
        args.api_url.clone(),
        Duration::from_secs(args.request_timeout_secs),
    )
    .expect("Could not create the ledger API client");

    let client_config = ClientConfig {
        refresh_interval: Duration::from_secs(args.refresh_interval_secs),
        tab_idle_timeout: Duration::from_secs(args.tab_idle_timeout_secs),
        sync_interval: Duration::from_secs(args.sync_interval_secs),
        ..Default::default()
    };

    let app_state = AppState::new(&secret, Arc::new(api), client_config.clone());
    let _sweeper = app_state
        .tabs
        .spawn_sweeper(client_config.sweep_interval, client_config.tab_idle_timeout);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router
        .layer(middleware::from_fn(logging_middleware))
        .layer(LiveReloadLayer::new());

    tracing::info!(
        "HTTP server listening on {addr}, using the ledger API at {}",
        args.api_url
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but the handlers log
        // their own errors, so disable that.
        .on_failure(());

    router.layer(tracing_layer)
}

#[cfg(test)]
mod args_tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn rejects_zero_intervals() {
        for flag in [
            "--refresh-interval-secs",
            "--tab-idle-timeout-secs",
            "--sync-interval-secs",
            "--request-timeout-secs",
        ] {
            let got = Args::try_parse_from([
                "server",
                "--api-url",
                "http://127.0.0.1:8080",
                flag,
                "0",
            ]);

            assert!(got.is_err(), "{flag} 0 should be rejected");
        }
    }

    #[test]
    fn accepts_defaults() {
        let args = Args::try_parse_from(["server", "--api-url", "http://127.0.0.1:8080"]).unwrap();

        assert_eq!(args.refresh_interval_secs, 600);
        assert_eq!(args.sync_interval_secs, 10);
    }
}
