//! Reqwest-backed ledger API adapter.
//!
//! This adapter owns transport details only: URL building, cookie
//! forwarding, status error mapping and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    header::{ACCEPT, COOKIE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    api::{ApiError, Credentials, LedgerApi},
    endpoints,
    model::{ContactId, Contacts, TransactionDraft, Transactions, User},
};

/// Ledger API adapter that sends HTTP requests to one base URL.
#[derive(Debug, Clone)]
pub struct HttpLedgerApi {
    client: Client,
    base_url: Url,
}

impl HttpLedgerApi {
    /// Build an adapter for the ledger API at `base_url` with a per-request timeout.
    ///
    /// Any path in `base_url` is kept as a prefix, e.g. `https://example.com/ledger`
    /// sends account requests to `https://example.com/ledger/oauth/v1/account`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        self.url_with_segments(path.split('/'))
    }

    fn contact_url(&self, contact_id: &ContactId) -> Result<Url, ApiError> {
        self.url_with_segments(
            endpoints::CONTACT_API
                .split('/')
                .chain(std::iter::once(contact_id.as_str())),
        )
    }

    fn url_with_segments<'a>(
        &self,
        segments: impl Iterator<Item = &'a str>,
    ) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments.filter(|segment| !segment.is_empty()));

        Ok(url)
    }

    fn request(&self, method: Method, url: Url, credentials: &Credentials) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");

        match credentials.cookie() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }
}

#[async_trait]
impl LedgerApi for HttpLedgerApi {
    async fn get_account(&self, credentials: &Credentials) -> Result<Option<User>, ApiError> {
        let url = self.endpoint_url(endpoints::ACCOUNT_API)?;
        let response = send(self.request(Method::GET, url, credentials)).await?;
        let account: Value = read_json(response).await?;

        Ok(User::from_value(account))
    }

    async fn refresh_session(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = self.endpoint_url(endpoints::REFRESH_API)?;
        send(self.request(Method::GET, url, credentials)).await?;

        Ok(())
    }

    async fn get_contacts(&self, credentials: &Credentials) -> Result<Contacts, ApiError> {
        let url = self.endpoint_url(endpoints::CONTACTS_API)?;
        let response = send(self.request(Method::GET, url, credentials)).await?;

        read_json(response).await
    }

    async fn add_contact(
        &self,
        credentials: &Credentials,
        contact_id: &ContactId,
    ) -> Result<bool, ApiError> {
        let url = self.contact_url(contact_id)?;
        let response = send(self.request(Method::PUT, url, credentials)).await?;

        read_json(response).await
    }

    async fn remove_contact(
        &self,
        credentials: &Credentials,
        contact_id: &ContactId,
    ) -> Result<(), ApiError> {
        let url = self.contact_url(contact_id)?;
        send(self.request(Method::DELETE, url, credentials)).await?;

        Ok(())
    }

    async fn get_transactions(&self, credentials: &Credentials) -> Result<Transactions, ApiError> {
        let url = self.endpoint_url(endpoints::TRANSACTIONS_API)?;
        let response = send(self.request(Method::GET, url, credentials)).await?;

        read_json(response).await
    }

    async fn create_transaction(
        &self,
        credentials: &Credentials,
        draft: &TransactionDraft,
    ) -> Result<(), ApiError> {
        let url = self.endpoint_url(endpoints::TRANSACTION_API)?;
        let request = self.request(Method::PUT, url, credentials).json(draft);
        send(request).await?;

        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();

    if !status.is_success() {
        tracing::debug!("Ledger API answered {status} for {}", response.url());
        return Err(ApiError::Status(status));
    }

    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(map_transport_error)?;

    serde_json::from_slice(&body).map_err(|error| ApiError::Decode(error.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    ApiError::Transport(error.to_string())
}

#[cfg(test)]
mod http_ledger_api_tests {
    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode, header::COOKIE},
        response::{IntoResponse, Response},
        routing::{get, put},
    };
    use reqwest::Url;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use crate::{
        api::{ApiError, Credentials, HttpLedgerApi, LedgerApi},
        endpoints,
        model::{Amount, ContactId, Participant, Timestamp, TransactionDraft},
    };

    const SESSION_COOKIE: &str = "session=abc123";

    #[derive(Clone, Default)]
    struct UpstreamState {
        created: Arc<Mutex<Vec<Value>>>,
        contact_requests: Arc<Mutex<Vec<String>>>,
    }

    fn has_session(headers: &HeaderMap) -> bool {
        headers.get(COOKIE).and_then(|value| value.to_str().ok()) == Some(SESSION_COOKIE)
    }

    async fn get_account(headers: HeaderMap) -> Response {
        if has_session(&headers) {
            Json(json!({"id": "1", "name": "Alice"})).into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    async fn get_contacts() -> Json<Value> {
        Json(json!({
            "2": {"name": "Bob", "email": "bob@example.com", "sent": true, "received": true}
        }))
    }

    async fn put_contact(
        State(state): State<UpstreamState>,
        Path(contact_id): Path<String>,
    ) -> (StatusCode, Json<bool>) {
        state.contact_requests.lock().unwrap().push(contact_id);

        (StatusCode::CREATED, Json(true))
    }

    async fn put_transaction(
        State(state): State<UpstreamState>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        state.created.lock().unwrap().push(body);

        Json(json!("created"))
    }

    async fn spawn_upstream(state: UpstreamState) -> SocketAddr {
        let app = Router::new()
            .route(endpoints::ACCOUNT_API, get(get_account))
            .route(endpoints::REFRESH_API, get(|| async { StatusCode::FORBIDDEN }))
            .route(endpoints::CONTACTS_API, get(get_contacts))
            .route("/api/v1/contact/{contact_id}", put(put_contact))
            .route(endpoints::TRANSACTIONS_API, get(|| async { "not json" }))
            .route(endpoints::TRANSACTION_API, put(put_transaction))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }

    fn get_api(addr: SocketAddr) -> HttpLedgerApi {
        let base_url = Url::parse(&format!("http://{addr}")).unwrap();

        HttpLedgerApi::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn session() -> Credentials {
        Credentials::new(Some(SESSION_COOKIE.to_owned()))
    }

    #[tokio::test]
    async fn forwards_session_cookie() {
        let api = get_api(spawn_upstream(UpstreamState::default()).await);

        let user = api.get_account(&session()).await.unwrap().unwrap();

        assert_eq!(user.name(), Some("Alice"));
    }

    #[tokio::test]
    async fn maps_status_errors() {
        let api = get_api(spawn_upstream(UpstreamState::default()).await);

        let got = api.get_account(&Credentials::default()).await;

        assert_eq!(got, Err(ApiError::Status(StatusCode::UNAUTHORIZED)));
        assert_eq!(
            api.refresh_session(&session()).await,
            Err(ApiError::Status(StatusCode::FORBIDDEN))
        );
    }

    #[tokio::test]
    async fn decodes_contacts() {
        let api = get_api(spawn_upstream(UpstreamState::default()).await);

        let contacts = api.get_contacts(&session()).await.unwrap();

        let bob = contacts.get(&ContactId::new("2")).unwrap();
        assert_eq!(bob.name, "Bob");
        assert!(bob.is_mutual());
    }

    #[tokio::test]
    async fn reports_invalid_json() {
        let api = get_api(spawn_upstream(UpstreamState::default()).await);

        let got = api.get_transactions(&session()).await;

        assert!(
            matches!(got, Err(ApiError::Decode(_))),
            "want decode error, got {got:?}"
        );
    }

    #[tokio::test]
    async fn encodes_contact_id_as_path_segment() {
        let state = UpstreamState::default();
        let api = get_api(spawn_upstream(state.clone()).await);

        let is_mutual = api
            .add_contact(&session(), &ContactId::new("a b/c"))
            .await
            .unwrap();

        assert!(is_mutual);
        assert_eq!(*state.contact_requests.lock().unwrap(), vec!["a b/c"]);
    }

    #[tokio::test]
    async fn sends_draft_as_json() {
        let state = UpstreamState::default();
        let api = get_api(spawn_upstream(state.clone()).await);
        let draft = TransactionDraft {
            amount: Amount::parse("12.34").unwrap(),
            participants: vec![Participant {
                id: ContactId::new("2"),
                name: "Bob".to_owned(),
            }],
            timestamp: Timestamp::from_millis(1_700_000_000_000),
        };

        api.create_transaction(&session(), &draft).await.unwrap();

        assert_eq!(
            *state.created.lock().unwrap(),
            vec![json!({
                "amount": 12.34,
                "participants": [{"id": "2", "name": "Bob"}],
                "timestamp": 1_700_000_000_000_i64,
            })]
        );
    }

    #[tokio::test]
    async fn reports_unreachable_api() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = get_api(addr);

        let got = api.get_contacts(&session()).await;

        assert!(
            matches!(got, Err(ApiError::Transport(_))),
            "want transport error, got {got:?}"
        );
    }

    #[test]
    fn keeps_base_url_path_prefix() {
        let base_url = Url::parse("https://example.com/ledger/").unwrap();
        let api = HttpLedgerApi::new(base_url, Duration::from_secs(1)).unwrap();

        let url = api.endpoint_url(endpoints::ACCOUNT_API).unwrap();

        assert_eq!(url.as_str(), "https://example.com/ledger/oauth/v1/account");
    }
}
