//! Scripted transport for exercising the client without a server

use crate::clock::ManualClock;
use crate::error::TransportError;
use crate::transport::{HttpRequest, RawResponse, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Reply = Result<RawResponse, TransportError>;

/// A [`Transport`] that replays queued replies in order.
///
/// Once the queue is empty the optional repeating reply is returned forever;
/// without one, further calls fail with a transport error. Every request is
/// recorded, together with the simulated time it was sent at when a
/// [`ManualClock`] is attached.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    repeating: Option<Reply>,
    requests: Mutex<Vec<HttpRequest>>,
    sent_at: Mutex<Vec<Duration>>,
    clock: Option<Arc<ManualClock>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: RawResponse) -> Self {
        self.push(Ok(response))
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    pub fn repeat(mut self, response: RawResponse) -> Self {
        self.repeating = Some(Ok(response));
        self
    }

    pub fn repeat_error(mut self, error: TransportError) -> Self {
        self.repeating = Some(Err(error));
        self
    }

    pub fn with_clock(mut self, clock: Arc<ManualClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Simulated send times; empty unless a clock is attached.
    pub fn sent_at(&self) -> Vec<Duration> {
        self.sent_at.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(self, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        if let Some(clock) = &self.clock {
            self.sent_at
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(clock.elapsed());
        }

        let queued = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match queued {
            Some(reply) => reply,
            None => self
                .repeating
                .clone()
                .unwrap_or_else(|| Err(TransportError::Other("no scripted reply left".to_string()))),
        }
    }
}
