//! Buffered responses.

use crate::{HttpClientError, Result};
use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;

/// A response whose body has been read completely.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
}

impl Response {
    pub(crate) async fn read(response: reqwest::Response) -> reqwest::Result<Self> {
        let status = response.status();
        let body = response.bytes().await?;
        Ok(Self { status, body })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Keep 2xx responses; anything else becomes [`HttpClientError::Response`]
    /// carrying the body, or the reason phrase when the body is blank.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let body = self.text();
        let message = if body.trim().is_empty() {
            self.status.canonical_reason().unwrap_or("no reason").to_string()
        } else {
            body
        };
        Err(HttpClientError::Response {
            status: self.status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> Response {
        Response {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn test_error_for_status_uses_body() {
        let err = response(404, "no such app").error_for_status().unwrap_err();
        assert!(matches!(err, HttpClientError::Response { status: 404, ref message } if message == "no such app"));
    }

    #[test]
    fn test_error_for_status_blank_body() {
        let err = response(503, " ").error_for_status().unwrap_err();
        assert!(matches!(err, HttpClientError::Response { ref message, .. } if message == "Service Unavailable"));
    }

    #[test]
    fn test_json() {
        let value: serde_json::Value = response(200, r#"{"a": 1}"#).json().unwrap();
        assert_eq!(value["a"], 1);
        assert!(response(200, "<html>").json::<serde_json::Value>().is_err());
    }
}
