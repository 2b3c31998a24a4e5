//! Blocking `reqwest` transport.

use crate::config::RemoteConfig;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Method};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

/// [`HttpClient`] backed by `reqwest::blocking`.
///
/// Must not be driven from inside an async runtime thread; async callers
/// go through `spawn_blocking`.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Builds a client with the timeout and user agent from `config`.
    pub fn new(config: &RemoteConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        if let Some(token) = request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| e.to_string())?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
