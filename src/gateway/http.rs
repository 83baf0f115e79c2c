use async_trait::async_trait;
use tracing::Instrument;

use super::{Method, RawResponse, Request, Transport, TransportError};

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.endpoint);

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| TransportError(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .instrument(tracing::trace_span!("send", %url))
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .instrument(tracing::trace_span!("read_body"))
            .await
            .map_err(|e| TransportError(e.to_string()))?
            .to_vec();

        tracing::trace!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());

        Ok(RawResponse { status, body })
    }
}
