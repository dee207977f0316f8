//! Request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::{Method, header};
use reqwest::Request;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const APPLICATION_JSON: &str = "application/json";

/// Builder for a single request.
///
/// Header names or values that are not valid HTTP surface as
/// [`HttpClientError::RequestBuild`] when the request is sent.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    inner: reqwest::RequestBuilder,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: Url) -> Self {
        let mut inner = client.inner().request(method, url);
        for (name, value) in &client.config().default_headers {
            inner = inner.header(name.as_str(), value.as_str());
        }
        Self { client, inner }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    /// `Accept: application/json`
    pub fn accept_json(mut self) -> Self {
        self.inner = self.inner.header(header::ACCEPT, APPLICATION_JSON);
        self
    }

    /// Append `key=value` to the query string.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.inner = self.inner.query(&[(key, value)]);
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| HttpClientError::Json(e.to_string()))?;
        let mut builder = self.json_content_type();
        builder.inner = builder.inner.body(bytes);
        Ok(builder)
    }

    /// `Content-Type: application/json` without a body.
    pub fn json_content_type(mut self) -> Self {
        self.inner = self.inner.header(header::CONTENT_TYPE, APPLICATION_JSON);
        self
    }

    /// Override the client timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    fn build(self) -> Result<(&'a HttpClient, Request)> {
        let request = self
            .inner
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;
        Ok((self.client, request))
    }

    pub async fn send(self) -> Result<Response> {
        let (client, request) = self.build()?;
        client.execute(request).await
    }
}
