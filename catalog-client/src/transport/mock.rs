//! Mock transport for testing.
//!
//! Routes responses by request line, captures sent requests, and can hold a
//! request in flight until the test releases it.

use super::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

/// Mock transport for testing.
///
/// Responses registered with [`respond_to`](Self::respond_to) answer only the
/// matching request line (`GET books?page=1&...`); responses queued with
/// [`queue_response`](Self::queue_response) answer anything else in FIFO
/// order. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    sent_requests: Vec<ApiRequest>,
    routes: HashMap<String, VecDeque<ApiResponse>>,
    sticky: HashMap<String, ApiResponse>,
    receive_queue: VecDeque<ApiResponse>,
    fail_next: Option<TransportError>,
    holds: HashMap<String, Arc<Semaphore>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a response for the next request without a route.
    pub fn queue_response(&self, status: u16, body: Value) {
        self.lock()
            .receive_queue
            .push_back(ApiResponse::new(status, body));
    }

    /// Queue a response for the next request with this exact line.
    pub fn respond_to(&self, line: impl Into<String>, status: u16, body: Value) {
        self.lock()
            .routes
            .entry(line.into())
            .or_default()
            .push_back(ApiResponse::new(status, body));
    }

    /// Answer every request with this line, after queued routes run out.
    pub fn always_respond_to(&self, line: impl Into<String>, status: u16, body: Value) {
        self.lock()
            .sticky
            .insert(line.into(), ApiResponse::new(status, body));
    }

    /// Cause the next request to fail with the given error.
    pub fn fail_next(&self, error: TransportError) {
        self.lock().fail_next = Some(error);
    }

    /// Block requests with this line until [`release`](Self::release).
    ///
    /// The request is recorded before it blocks.
    pub fn hold(&self, line: impl Into<String>) {
        self.lock()
            .holds
            .insert(line.into(), Arc::new(Semaphore::new(0)));
    }

    /// Let held requests with this line proceed.
    pub fn release(&self, line: &str) {
        if let Some(gate) = self.lock().holds.remove(line) {
            // Closing wakes every waiter.
            gate.close();
        }
    }

    /// All requests sent so far.
    pub fn sent_requests(&self) -> Vec<ApiRequest> {
        self.lock().sent_requests.clone()
    }

    /// Lines of all requests sent so far.
    pub fn sent_lines(&self) -> Vec<String> {
        self.lock().sent_requests.iter().map(ApiRequest::line).collect()
    }

    /// The last request sent.
    pub fn last_sent(&self) -> Option<ApiRequest> {
        self.lock().sent_requests.last().cloned()
    }

    /// Number of requests sent.
    pub fn request_count(&self) -> usize {
        self.lock().sent_requests.len()
    }

    /// Number of requests sent with this exact line.
    pub fn count_line(&self, line: &str) -> usize {
        self.lock()
            .sent_requests
            .iter()
            .filter(|r| r.line() == line)
            .count()
    }

    /// Clear all state.
    pub fn reset(&self) {
        let mut inner = self.lock();
        for gate in inner.holds.values() {
            gate.close();
        }
        *inner = MockTransportInner::default();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let line = request.line();
        let gate = {
            let mut inner = self.lock();
            inner.sent_requests.push(request);
            inner.holds.get(&line).cloned()
        };

        if let Some(gate) = gate {
            // Only ever closed, never given permits.
            let _ = gate.acquire().await;
        }

        let mut inner = self.lock();
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        if let Some(response) = inner.routes.get_mut(&line).and_then(VecDeque::pop_front) {
            return Ok(response);
        }
        if let Some(response) = inner.sticky.get(&line) {
            return Ok(response.clone());
        }
        inner
            .receive_queue
            .pop_front()
            .ok_or_else(|| TransportError::ConnectionFailed(format!("no response for {line}")))
    }
}
