//! Transport to the blog API.
//!
//! [`ApiGateway::call`] is the single place where a request is shaped and a
//! response is judged: JSON bodies get `Content-Type: application/json`, a
//! token becomes `Authorization: Bearer <token>`, the body is parsed as JSON
//! whatever the status, and a non-2xx status turns into
//! [`ClientError::Api`]. The gateway holds no state and never retries.
//!
//! The wire itself sits behind [`Transport`] so it can be swapped for
//! [`mock::MockTransport`] in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::Token;
use crate::errors::ClientError;

pub mod endpoints;
pub mod http;
pub mod mock;

pub use endpoints::AuthPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl ::std::fmt::Display for Method {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub bearer: Option<Token>,
}

impl Request {
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![];

        if self.body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        if let Some(token) = &self.bearer {
            headers.push(("Authorization", format!("Bearer {}", token.expose())));
        }

        headers
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Failure before any response was received.
#[derive(Debug, Clone)]
pub struct TransportError(pub String);

#[async_trait]
pub trait Transport {
    async fn send(&self, request: Request) -> Result<RawResponse, TransportError>;
}

#[derive(Clone)]
pub struct ApiGateway {
    transport: Arc<dyn Transport + Sync + Send>,
}

impl ApiGateway {
    pub fn new(transport: Arc<dyn Transport + Sync + Send>) -> Self { Self { transport } }

    #[tracing::instrument(skip(self, body, token))]
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        token: Option<&Token>,
    ) -> Result<Value, ClientError> {
        let request = Request {
            method,
            endpoint: endpoint.to_string(),
            body,
            bearer: token.cloned(),
        };

        let result = match self.transport.send(request).await {
            Ok(response) => judge(response),
            Err(TransportError(m)) => Err(ClientError::Network(m)),
        };

        match &result {
            Ok(_) => tracing::debug!("{} {} succeeded", method, endpoint),
            Err(e) => tracing::warn!("API call failed: {} {}: {}", method, endpoint, e),
        }

        result
    }
}

fn judge(RawResponse { status, body }: RawResponse) -> Result<Value, ClientError> {
    let ok = (200..300).contains(&status);

    let parsed = match body.iter().all(u8::is_ascii_whitespace) {
        true => Ok(Value::Null),
        false => serde_json::from_slice::<Value>(&body),
    };

    match (ok, parsed) {
        (true, Ok(data)) => Ok(data),
        (true, Err(e)) => Err(ClientError::Decode(e.to_string())),
        (false, Ok(data)) => Err(ClientError::api(
            status,
            data.get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        )),
        (false, Err(_)) => Err(ClientError::api(status, None)),
    }
}
