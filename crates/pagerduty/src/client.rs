//! Client and the response-decoding helpers shared by every resource.
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use url::Url;

use crate::{
    error::{Error, Result},
    query::Query,
    transport::{ApiResponse, HttpClient, Transport},
};

/// Name of the header identifying the user performing a mutating action.
pub const FROM_HEADER: &str = "from";

/// Client for the PagerDuty REST API.
///
/// Every resource operation is a single request through the [`Transport`];
/// nothing is retried or cached.
#[derive(Debug, Clone)]
pub struct Client<T = HttpClient> {
    transport: T,
}

impl Client {
    /// Create a client for the production API authenticated with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_transport(HttpClient::new(token))
    }

    /// Create a client for a custom endpoint.
    pub fn with_base_url(token: impl Into<String>, base_url: Url) -> Self {
        Self::from_transport(HttpClient::with_base_url(token, base_url))
    }
}

impl<T> Client<T> {
    /// Create a client on top of any [`Transport`].
    pub const fn from_transport(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Client<T> {
    pub(crate) async fn get(&self, path: &str, query: &Query) -> Result<ApiResponse> {
        self.transport.get(path, query).await?.error_for_status()
    }

    pub(crate) async fn post<B>(&self, path: &str, body: &B, headers: HeaderMap) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(Error::Encode)?;
        self.transport.post(path, &body, headers).await?.error_for_status()
    }

    pub(crate) async fn put<B>(&self, path: &str, body: &B, headers: HeaderMap) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(Error::Encode)?;
        self.transport.put(path, &body, headers).await?.error_for_status()
    }
}

/// Headers carrying the `From` address required by mutating endpoints.
pub(crate) fn from_headers(from: &str) -> Result<HeaderMap> {
    let value = HeaderValue::from_str(from)
        .map_err(|source| Error::InvalidHeader { name: FROM_HEADER, source })?;
    let mut headers = HeaderMap::new();
    headers.insert(FROM_HEADER, value);
    Ok(headers)
}

/// Decode the whole response body.
pub(crate) fn decode_json<R: DeserializeOwned>(resp: &ApiResponse) -> Result<R> {
    serde_json::from_str(&resp.body).map_err(Error::Decode)
}

/// Decode the value stored under `key` in a `{"<key>": ...}` envelope.
///
/// A `null` value counts as missing.
pub(crate) fn decode_envelope<R: DeserializeOwned>(resp: &ApiResponse, key: &'static str) -> Result<R> {
    let mut envelope: Map<String, Value> = decode_json(resp)?;
    let value = envelope.remove(key).filter(|v| !v.is_null()).ok_or(Error::MissingField(key))?;
    serde_json::from_value(value).map_err(Error::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn ok(body: &str) -> ApiResponse {
        ApiResponse::new(StatusCode::OK, body)
    }

    #[test]
    fn envelope_returns_inner_value() {
        let notes: Vec<String> = decode_envelope(&ok(r#"{"notes": ["a", "b"]}"#), "notes").unwrap();
        assert_eq!(notes, ["a", "b"]);
    }

    #[test]
    fn envelope_missing_key() {
        let err = decode_envelope::<Value>(&ok(r#"{"foo": {}}"#), "incident").unwrap_err();
        assert!(matches!(err, Error::MissingField("incident")));
    }

    #[test]
    fn envelope_null_is_missing() {
        let err = decode_envelope::<Vec<String>>(&ok(r#"{"notes": null}"#), "notes").unwrap_err();
        assert!(matches!(err, Error::MissingField("notes")));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = decode_envelope::<Value>(&ok("{not json"), "incident").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = decode_envelope::<Value>(&ok("[]"), "incident").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn from_header_rejects_invalid_values() {
        let headers = from_headers("oncall@example.com").unwrap();
        assert_eq!(headers.get(FROM_HEADER).unwrap(), "oncall@example.com");

        let err = from_headers("bad\nvalue").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { name: FROM_HEADER, .. }));
    }
}
