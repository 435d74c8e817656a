#[expect(dead_code, reason = "session fixtures are unused by the transport tests")]
mod common;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use breeze_connect::transport::{HeaderTransport, LoggingTransport, RetryTransport, pipeline};
use breeze_connect::{
    ApiRequest, Error, Headers, HttpRequest, Kind, RequestExecutor, RequestMethod, RetryPolicy,
    Transport,
};
use common::{MockTransport, network_error, response};
use reqwest::StatusCode;
use serde_json::json;
use tracing::Dispatch;
use url::Url;

fn request() -> HttpRequest {
    HttpRequest::new(
        RequestMethod::Get,
        Url::parse("http://breeze.test/api/v1/funds").unwrap(),
        [("X-SessionToken", "TOK123")].into_iter().collect(),
        Some("{}".to_owned()),
    )
}

fn no_delay(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO)
}

#[tokio::test]
async fn retry_gives_up_after_max_attempts() {
    let mock = MockTransport::unreachable();
    let transport = RetryTransport::new(Arc::clone(&mock), no_delay(3));

    let err = transport.execute(request()).await.unwrap_err();

    assert_eq!(mock.calls(), 3);
    assert_eq!(err.kind(), Kind::Transport);
    assert!(err.to_string().contains("gave up after 3 attempt(s)"));
}

#[tokio::test]
async fn retry_returns_first_success() {
    let mock = MockTransport::new(|call, _| {
        if call < 2 {
            Err(network_error())
        } else {
            Ok(response(StatusCode::OK, &json!({"Status": 200})))
        }
    });
    let transport = RetryTransport::new(Arc::clone(&mock), no_delay(3));

    let response = transport.execute(request()).await.unwrap();

    assert_eq!(mock.calls(), 3);
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn error_statuses_are_not_retried() {
    let mock = MockTransport::always(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"Status": 500, "Error": "boom"}),
    );
    let transport = RetryTransport::new(Arc::clone(&mock), no_delay(3));

    let response = transport.execute(request()).await.unwrap();

    assert_eq!(mock.calls(), 1);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn non_transport_errors_are_not_retried() {
    let mock = MockTransport::new(|_, _| {
        Err(Error::with_source(
            Kind::Body,
            io::Error::new(io::ErrorKind::UnexpectedEof, "body cut short"),
        ))
    });
    let transport = RetryTransport::new(Arc::clone(&mock), no_delay(3));

    let err = transport.execute(request()).await.unwrap_err();

    assert_eq!(mock.calls(), 1);
    assert_eq!(err.kind(), Kind::Body);
}

#[tokio::test]
async fn retry_sleeps_between_attempts_only() {
    let mock = MockTransport::unreachable();
    let transport = RetryTransport::new(Arc::clone(&mock), RetryPolicy::new(3, Duration::from_millis(30)));

    let started = tokio::time::Instant::now();
    transport.execute(request()).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(mock.calls(), 3);
    assert!(elapsed >= Duration::from_millis(60), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn fixed_headers_are_merged_before_the_base() {
    let mock = MockTransport::always(StatusCode::OK, json!({}));
    let fixed: Headers = [("User-Agent", "breeze-test"), ("X-AppKey", "FIXED")]
        .into_iter()
        .collect();
    let transport = HeaderTransport::new(Arc::clone(&mock), fixed);

    let mut req = request();
    req.headers.insert("X-AppKey", "K");
    transport.execute(req).await.unwrap();

    let sent = mock.last_request();
    assert_eq!(sent.headers.get("User-Agent"), Some("breeze-test"));
    assert_eq!(sent.headers.get("X-AppKey"), Some("FIXED"));
    assert_eq!(sent.headers.get("X-SessionToken"), Some("TOK123"));
}

#[tokio::test]
async fn header_names_reach_the_transport_unchanged() {
    let mock = MockTransport::always(StatusCode::OK, json!({}));
    let transport = pipeline(Arc::clone(&mock), Headers::new(), no_delay(1), None);

    transport.execute(request()).await.unwrap();

    let sent = mock.last_request();
    let names: Vec<&str> = sent.headers.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["X-SessionToken"]);
    assert_eq!(sent.headers.get("X-Sessiontoken"), None);
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    fn dispatch(&self) -> Dispatch {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        Dispatch::new(subscriber)
    }
}

#[tokio::test]
async fn logging_goes_to_the_injected_dispatch() {
    let capture = Capture::default();
    let mock = MockTransport::always(StatusCode::OK, json!({}));
    let transport = LoggingTransport::new(Arc::clone(&mock), Some(capture.dispatch()));

    transport.execute(request()).await.unwrap();

    let logs = capture.contents();
    assert!(logs.contains("sending request"), "{logs}");
    assert!(logs.contains("response received"), "{logs}");
    assert!(logs.contains("http://breeze.test/api/v1/funds"), "{logs}");
    assert!(!logs.contains("TOK123"), "{logs}");
}

#[tokio::test]
async fn logging_records_failures_without_changing_them() {
    let capture = Capture::default();
    let mock = MockTransport::unreachable();
    let transport = pipeline(Arc::clone(&mock), Headers::new(), no_delay(2), Some(capture.dispatch()));

    let err = transport.execute(request()).await.unwrap_err();

    assert_eq!(err.kind(), Kind::Transport);
    assert_eq!(mock.calls(), 2);
    let logs = capture.contents();
    assert!(logs.contains("transport failure, retrying"), "{logs}");
    assert!(logs.contains("request failed"), "{logs}");
}

#[tokio::test]
async fn executor_validates_before_sending() {
    let mock = MockTransport::always(StatusCode::OK, json!({}));
    let executor = RequestExecutor::new(Arc::<MockTransport>::clone(&mock));

    let err = executor
        .execute(ApiRequest::builder().url("http://breeze.test/funds").build())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::Validation);

    let err = executor
        .execute(
            ApiRequest::builder()
                .method(RequestMethod::Get)
                .url("breeze funds")
                .build(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::Construction);

    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn executor_returns_body_for_error_status() {
    let mock = MockTransport::always(
        StatusCode::BAD_REQUEST,
        json!({"Status": 400, "Error": "bad request"}),
    );
    let executor = RequestExecutor::new(Arc::<MockTransport>::clone(&mock));

    let body = executor
        .execute(
            ApiRequest::builder()
                .method(RequestMethod::Delete)
                .url("http://breeze.test/api/v1/order")
                .build(),
        )
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["Error"], "bad request");
    assert!(mock.last_request().body.is_none());
}
