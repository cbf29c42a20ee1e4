// Shared fixtures for avtable behaviour tests
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use avtable_core::{
    AvClient, AvError, AvErrorKind, Cell, ClientConfig, CredentialStore, HttpClient, HttpError,
    HttpRequest, HttpResponse, ParameterSet, StaticCredentials, Table,
};

/// Transport that replays one canned outcome and records every request.
#[derive(Debug)]
pub struct ScriptedHttpClient {
    outcome: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn responding(response: HttpResponse) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: HttpError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// Transport that fails the test if it is ever called.
#[derive(Debug, Default)]
pub struct ForbiddenHttpClient {
    calls: AtomicUsize,
}

impl ForbiddenHttpClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for ForbiddenHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("transport must not be invoked, got request to {}", request.url);
    }
}

pub const TEST_KEY: &str = "super-secret-key";

pub fn client_with(transport: Arc<dyn HttpClient>) -> AvClient {
    AvClient::new(
        transport,
        Arc::new(StaticCredentials::new(TEST_KEY)),
        ClientConfig::default(),
    )
}

pub fn assert_close(cell: Option<&Cell>, expected: f64) {
    let actual = cell.and_then(Cell::as_f64).expect("numeric cell");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
