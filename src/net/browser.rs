//! Browser transport over `gloo-net` (hydrate only).

use gloo_net::http::{Request, RequestBuilder};

use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::SessionConfig;
use crate::error::TransportError;

pub struct BrowserTransport {
    config: SessionConfig,
}

impl BrowserTransport {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self { config: config.clone() }
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        match method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Delete => Request::delete(&url),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self.builder(request.method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let prepared = match &request.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = prepared.send().await.map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}
