use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::{HttpResponse, RequestOptions};
use crate::transport::Transport;

/// Transport that records every request and answers with a fixed response.
#[derive(Clone)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<RequestOptions>>>,
    response: HttpResponse,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::responding(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "[]".to_string(),
        })
    }

    pub fn responding(response: HttpResponse) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }

    pub fn requests(&self) -> Vec<RequestOptions> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RequestOptions {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: RequestOptions) -> Result<HttpResponse, BoxError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.clone())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("connection refused by {host}")]
pub struct ConnectionRefused {
    pub host: String,
}

/// Transport that always fails with `ConnectionRefused`.
pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, request: RequestOptions) -> Result<HttpResponse, BoxError> {
        Err(Box::new(ConnectionRefused { host: request.url }))
    }
}
