//! Thin request/response layer over `reqwest`.
//!
//! Responses are read fully into a plain [`Response`] so callers can inspect
//! status and body without holding on to the connection. Retries are not
//! performed at this layer.

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// The verbs the directory API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    /// Any 2xx, including `204 No Content`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// No body, or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Decodes the whole body. An empty body is an error here; check
    /// [`Response::is_empty`] first where that is acceptable.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The human-readable `detail` of an error payload.
    ///
    /// Validation failures report `detail` as a list of `{msg, ..}` objects;
    /// their messages are joined.
    pub fn detail(&self) -> Option<String> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;
        match value.get("detail")? {
            Value::String(detail) => Some(detail.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, Error)]
#[error("transport failure: {message}")]
pub struct HttpError {
    pub message: String,
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_owned()
        } else if err.is_connect() {
            format!("could not connect: {err}")
        } else {
            err.to_string()
        };
        Self { message }
    }
}

/// One outgoing request, built up before it is sent.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    bearer: Option<String>,
    json: Option<Vec<u8>>,
}

impl Request {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            json: None,
        }
    }

    /// `url` is absolute; nothing is resolved against a base here.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sent as `Authorization: Bearer <token>`.
    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_owned());
        self
    }

    /// Serializes `value` now, so encoding errors surface before sending.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.json = Some(serde_json::to_vec(value)?);
        Ok(self)
    }

    /// Sends and reads the body to the end. Any status, including 4xx and
    /// 5xx, comes back as `Ok`; only transport failures are errors.
    pub async fn send(self, client: &reqwest::Client) -> Result<Response, HttpError> {
        let mut request = match self.method {
            Method::Get => client.get(&self.url),
            Method::Post => client.post(&self.url),
            Method::Patch => client.patch(&self.url),
            Method::Delete => client.delete(&self.url),
        };
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = self.json {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(Response { status, body })
    }
}
