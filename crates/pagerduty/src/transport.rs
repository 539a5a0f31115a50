//! HTTP collaborator used by [`crate::Client`].
use std::time::Instant;

use async_trait::async_trait;
use derive_more::Debug;
use reqwest::{
    Method, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap},
};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::{
    error::{Error, Result},
    query::Query,
};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.pagerduty.com";

/// Media type selecting version 2 of the REST API.
pub const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Turn a non-2xx response into [`Error::Api`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::from_response(self.status, &self.body))
        }
    }
}

/// Performs requests against the API on behalf of [`crate::Client`].
///
/// Implementations own authentication, base URL resolution and connection
/// handling. They return the response as-is; status checking and decoding
/// happen in the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET path?query`
    async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse>;

    /// `POST path` with a JSON body and extra headers.
    async fn post(&self, path: &str, body: &Value, headers: HeaderMap) -> Result<ApiResponse>;

    /// `PUT path` with a JSON body and extra headers.
    async fn put(&self, path: &str, body: &Value, headers: HeaderMap) -> Result<ApiResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpClient {
    #[debug(skip)]
    http: reqwest::Client,
    #[debug(skip)]
    token: String,
    base_url: String,
}

impl HttpClient {
    /// Create a client for the production API.
    pub fn new(token: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), token: token.into(), base_url: DEFAULT_BASE_URL.to_owned() }
    }

    /// Create a client for a custom endpoint.
    pub fn with_base_url(token: impl Into<String>, base_url: Url) -> Self {
        Self::with_http(reqwest::Client::new(), token, base_url)
    }

    /// Create a client around a preconfigured `reqwest` client (timeouts, proxies, TLS).
    pub fn with_http(http: reqwest::Client, token: impl Into<String>, base_url: Url) -> Self {
        Self { http, token: token.into(), base_url: base_url.into() }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: Option<&Query>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url.trim_end_matches('/'), path))?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(&query.encode()));
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<ApiResponse> {
        let url = self.url(path, query)?;
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(ACCEPT, ACCEPT_V2)
            .header(AUTHORIZATION, format!("Token token={}", self.token))
            .headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let result = async {
            let resp = request.send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>(ApiResponse { status, body })
        }
        .await;

        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(resp) => {
                debug!(%method, path, status = resp.status.as_u16(), duration_ms, "PagerDuty request")
            }
            Err(e) => error!(%method, path, duration_ms, error = %e, "PagerDuty request failed"),
        }
        result.map_err(Into::into)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse> {
        self.send(Method::GET, path, Some(query), None, HeaderMap::new()).await
    }

    async fn post(&self, path: &str, body: &Value, headers: HeaderMap) -> Result<ApiResponse> {
        self.send(Method::POST, path, None, Some(body), headers).await
    }

    async fn put(&self, path: &str, body: &Value, headers: HeaderMap) -> Result<ApiResponse> {
        self.send(Method::PUT, path, None, Some(body), headers).await
    }
}
