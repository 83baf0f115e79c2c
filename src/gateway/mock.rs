use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{oneshot, Mutex};

use super::{Method, RawResponse, Request, Transport, TransportError};

type Reply = Result<RawResponse, TransportError>;

enum Scripted {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Replays scripted replies, first in first out per `(method, endpoint)`.
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    sent: Mutex<Vec<Request>>,
}

/// Releases a deferred reply.
pub struct Responder(oneshot::Sender<Reply>);

impl Responder {
    pub fn respond(self, status: u16, body: Value) {
        let _ = self.0.send(Ok(RawResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    pub fn fail(self, message: &str) {
        let _ = self.0.send(Err(TransportError(message.to_string())));
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            sent: Mutex::new(vec![]),
        }
    }

    async fn push(&self, method: Method, endpoint: &str, scripted: Scripted) {
        self.routes
            .lock()
            .await
            .entry((method, endpoint.to_string()))
            .or_default()
            .push_back(scripted);
    }

    pub async fn reply(&self, method: Method, endpoint: &str, status: u16, body: Value) {
        self.reply_raw(method, endpoint, status, body.to_string().into_bytes())
            .await
    }

    pub async fn reply_raw(&self, method: Method, endpoint: &str, status: u16, body: Vec<u8>) {
        let reply = Ok(RawResponse { status, body });
        self.push(method, endpoint, Scripted::Ready(reply)).await
    }

    pub async fn fail(&self, method: Method, endpoint: &str, message: &str) {
        let reply = Err(TransportError(message.to_string()));
        self.push(method, endpoint, Scripted::Ready(reply)).await
    }

    pub async fn defer(&self, method: Method, endpoint: &str) -> Responder {
        let (tx, rx) = oneshot::channel();
        self.push(method, endpoint, Scripted::Deferred(rx)).await;
        Responder(tx)
    }

    pub async fn sent(&self) -> Vec<Request> { self.sent.lock().await.clone() }

    /// Yields until at least `n` requests have claimed their replies.
    pub async fn wait_for_requests(&self, n: usize) {
        while self.sent.lock().await.len() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, TransportError> {
        let key = (request.method, request.endpoint.clone());

        // claim the reply before the request shows up in `sent`
        let scripted = self
            .routes
            .lock()
            .await
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        self.sent.lock().await.push(request);

        tracing::trace!("mock reply for {} {}", key.0, key.1);

        match scripted {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Deferred(rx)) => match rx.await {
                Ok(reply) => reply,
                Err(_) => Err(TransportError("responder dropped".to_string())),
            },
            None => Err(TransportError(format!(
                "no reply scripted for {} {}",
                key.0, key.1
            ))),
        }
    }
}
