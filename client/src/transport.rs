//! HttpTransport trait, its implementations, and the invoker that is the only
//! place transport faults become [`ClientError`]s.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::TransportOptions;
use crate::error::ClientError;
use crate::request::HttpRequest;

// ------------------------------------------------------------------ //
//  Types                                                              //
// ------------------------------------------------------------------ //

/// What came back over the wire, whatever the status code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A failure below HTTP: DNS, refused connection, TLS, timeout, broken body.
#[derive(Debug, Error)]
pub enum TransportFault {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Connection(String),
}

// ------------------------------------------------------------------ //
//  Trait                                                              //
// ------------------------------------------------------------------ //

/// Executes one built request. Non-2xx statuses are responses, not faults.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportFault>;
}

// ------------------------------------------------------------------ //
//  ReqwestTransport (production)                                      //
// ------------------------------------------------------------------ //

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(options.user_agent.as_str());
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportFault> {
        let mut builder = self.http.request(request.method.clone(), request.url.clone());
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type)
                .body(body.bytes.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }

        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

// ------------------------------------------------------------------ //
//  FakeTransport (for tests)                                          //
// ------------------------------------------------------------------ //

/// In-memory transport that records requests and replays queued outcomes.
///
/// With nothing queued it answers `204 No Content`.
#[derive(Debug, Default, Clone)]
pub struct FakeTransport {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    outcomes: Arc<Mutex<VecDeque<Result<RawResponse, String>>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered request.
    pub fn respond(&self, response: RawResponse) -> &Self {
        self.outcomes.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a connection failure for the next unanswered request.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.outcomes.lock().unwrap().push_back(Err(message.into()));
        self
    }

    /// Non-destructive snapshot of the requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, TransportFault> {
        self.requests.lock().unwrap().push(request.clone());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportFault::Connection(message)),
            None => Ok(RawResponse::new(204)),
        }
    }
}

// ------------------------------------------------------------------ //
//  Invoker                                                            //
// ------------------------------------------------------------------ //

/// Runs built requests on the injected transport.
#[derive(Clone)]
pub struct Invoker {
    transport: Arc<dyn HttpTransport>,
}

impl Invoker {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn invoke(&self, request: &HttpRequest) -> Result<RawResponse, ClientError> {
        debug!(method = %request.method, path = request.template, "dispatching request");

        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(
                    method = %request.method,
                    path = request.template,
                    status = response.status,
                    "response received"
                );
                Ok(response)
            }
            Err(fault) => {
                warn!(
                    method = %request.method,
                    path = request.template,
                    error = %fault,
                    "transport failure"
                );
                Err(ClientError::Transport {
                    method: request.method.clone(),
                    path: request.template.to_string(),
                    source: fault,
                })
            }
        }
    }
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use url::Url;

    fn request() -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            template: "/db",
            url: Url::parse("http://localhost:8086/db").unwrap(),
            body: None,
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = RawResponse::new(200).with_header("X-Influxdb-Version", "0.8.8");
        assert_eq!(response.header("x-influxdb-version"), Some("0.8.8"));
        assert_eq!(response.header("X-INFLUXDB-VERSION"), Some("0.8.8"));
    }

    #[test]
    fn success_range() {
        assert!(RawResponse::new(204).is_success());
        assert!(!RawResponse::new(301).is_success());
        assert!(!RawResponse::new(500).is_success());
    }

    #[tokio::test]
    async fn fake_replays_in_order_and_records() {
        let fake = FakeTransport::new();
        fake.respond(RawResponse::new(200).with_body("[]")).fail("refused");

        let first = fake.execute(&request()).await.unwrap();
        assert_eq!(first.body, b"[]".to_vec());
        assert!(matches!(fake.execute(&request()).await, Err(TransportFault::Connection(_))));
        assert_eq!(fake.execute(&request()).await.unwrap().status, 204);
        assert_eq!(fake.requests().len(), 3);
    }

    #[tokio::test]
    async fn invoker_passes_non_success_status_through() {
        let fake = FakeTransport::new();
        fake.respond(RawResponse::new(500).with_body("boom"));
        let invoker = Invoker::new(Arc::new(fake));

        let response = invoker.invoke(&request()).await.unwrap();
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn invoker_wraps_faults_with_method_and_path() {
        let fake = FakeTransport::new();
        fake.fail("connection refused");
        let invoker = Invoker::new(Arc::new(fake));

        let err = invoker.invoke(&request()).await.unwrap_err();
        match err {
            ClientError::Transport { method, path, source } => {
                assert_eq!(method, Method::GET);
                assert_eq!(path, "/db");
                assert!(source.to_string().contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
