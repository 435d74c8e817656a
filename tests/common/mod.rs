use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use breeze_connect::{
    BreezeClient, ClientConfig, Error, HttpRequest, HttpResponse, Kind, Result, RetryPolicy,
    Transport,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::sync::Notify;
use url::Url;

type Responder = dyn Fn(usize, &HttpRequest) -> Result<HttpResponse> + Send + Sync;

/// In-memory transport that records every request it sees.
///
/// The responder gets the zero-based call index and the request.
pub struct MockTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
    responder: Box<Responder>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(usize, &HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    /// Answers every request with `status` and `body`.
    pub fn always(status: StatusCode, body: Value) -> Arc<Self> {
        Self::new(move |_, _| Ok(response(status, &body)))
    }

    /// Fails every request at the network level.
    pub fn unreachable() -> Arc<Self> {
        Self::new(|_, _| Err(network_error()))
    }

    /// Routes by the last path segment of the request URL.
    pub fn routes(routes: Vec<(&'static str, Value)>) -> Arc<Self> {
        Self::new(move |_, request| {
            let path = request.url.path().trim_end_matches('/');
            routes
                .iter()
                .find(|(endpoint, _)| path.ends_with(endpoint))
                .map(|(_, body)| response(StatusCode::OK, body))
                .ok_or_else(network_error)
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("at least one request")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(call, &request)
    }
}

/// Holds every request until [`GatedTransport::open`] lets one through.
pub struct GatedTransport {
    inner: Arc<MockTransport>,
    gate: Notify,
}

impl GatedTransport {
    pub fn new(inner: Arc<MockTransport>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gate: Notify::new(),
        })
    }

    /// Releases one waiting request, or the next one to arrive.
    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.gate.notified().await;
        self.inner.execute(request).await
    }
}

pub fn response(status: StatusCode, body: &Value) -> HttpResponse {
    HttpResponse::new(status, serde_json::to_vec(body).unwrap())
}

pub fn network_error() -> Error {
    Error::with_source(
        Kind::Transport,
        io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
    )
}

pub fn customer_details(token: &str) -> Value {
    json!({
        "Status": 200,
        "Error": null,
        "Success": {
            "exg_trade_date": {"NSE": "05-Mar-2024", "BSE": "05-Mar-2024", "FNO": "05-Mar-2024", "NDX": "05-Mar-2024"},
            "exg_status": {"NSE": "O", "BSE": "O", "FNO": "O", "NDX": "C"},
            "segments_allowed": {"Trading": "Y", "Equity": "Y", "Derivatives": "Y", "Currency": "N"},
            "idirect_userid": "USER1",
            "session_token": token,
            "idirect_user_name": "Test User",
            "idirect_lastlogin_time": "05-Mar-2024 09:00:00"
        }
    })
}

pub fn funds() -> Value {
    json!({
        "Status": 200,
        "Error": null,
        "Success": {
            "bank_account": "000101010101",
            "total_bank_balance": 150000.5,
            "allocated_equity": 100000,
            "allocated_fno": 0,
            "allocated_commodity": 0,
            "allocated_currency": 0,
            "block_by_trade_equity": 0,
            "block_by_trade_fno": 0,
            "block_by_trade_commodity": 0,
            "block_by_trade_currency": 0,
            "block_by_trade_balance": 0,
            "unallocated_balance": "50000.5"
        }
    })
}

pub fn business_error(message: &str) -> Value {
    json!({"Status": 500, "Error": message, "Success": null})
}

/// `K`/`S` credentials, no retry delay, local base URL.
pub fn config(session_key: Option<&str>) -> ClientConfig {
    ClientConfig::builder()
        .app_key("K")
        .app_secret("S")
        .maybe_session_key(session_key)
        .base_url(Url::parse("http://breeze.test/api/v1/").unwrap())
        .retry(RetryPolicy::new(3, Duration::ZERO))
        .build()
        .unwrap()
}

pub fn client<T: Transport + 'static>(session_key: Option<&str>, transport: Arc<T>) -> BreezeClient {
    BreezeClient::with_transport(config(session_key), transport).unwrap()
}
