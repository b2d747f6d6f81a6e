//! Recording transport used by unit tests.

use crate::client::{DOWNLOAD_CONTENT_TYPE, DownloadError, HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) const DAILY_HEADER: &str = "timestamp,open,high,low,close,volume\n";
pub(crate) const INTRADAY_HEADER: &str = "time,open,high,low,close,volume\n";

/// Replays queued responses in order and records every request.
///
/// Once the queue is empty it answers with an empty CSV download.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, DownloadError>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, response: HttpResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub(crate) fn fail(self, status: u16) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(DownloadError::ServerError { status }));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, DownloadError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(csv(DAILY_HEADER)))
    }
}

pub(crate) fn csv(body: &str) -> HttpResponse {
    HttpResponse::new(200, Some(DOWNLOAD_CONTENT_TYPE), body)
}

pub(crate) fn json(body: &str) -> HttpResponse {
    HttpResponse::new(200, Some("application/json"), body)
}
