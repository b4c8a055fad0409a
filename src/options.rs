//! Per-call request options and the defaults merge used for auth options.

use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{Error, Result};

/// Options for an individual HTTP request.
///
/// Auth strategies produce the same type: their options are merged into the
/// caller's with [`RequestOptions::merge_defaults`], so the caller always wins
/// on conflicting keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Request headers.
    pub headers: HeaderMap,

    /// Query parameters appended to the target URL.
    pub query: BTreeMap<String, String>,

    /// Structured body, sent as JSON.
    pub json: Option<serde_json::Value>,

    /// Raw body bytes. Ignored when `json` is set.
    pub body: Option<Vec<u8>>,

    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, replacing any previous value under the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds multiple query parameters.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query.extend(params);
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))?;
        self.json = Some(value);
        Ok(self)
    }

    /// Sets a raw body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns `true` if no option is set.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.query.is_empty()
            && self.json.is_none()
            && self.body.is_none()
            && self.timeout.is_none()
    }

    /// Returns `true` if a JSON or raw body is set.
    pub fn has_body(&self) -> bool {
        self.json.is_some() || self.body.is_some()
    }

    /// Fills in anything from `defaults` that `self` does not already set.
    ///
    /// Headers and query parameters are merged key by key. A body from
    /// `defaults` is only taken when `self` carries none.
    pub fn merge_defaults(&mut self, defaults: RequestOptions) {
        let mut current: Option<HeaderName> = None;
        let mut take = false;
        for (name, value) in defaults.headers {
            // `None` names continue the previous header's values.
            if let Some(name) = name {
                take = !self.headers.contains_key(&name);
                current = Some(name);
            }
            if let (true, Some(name)) = (take, current.as_ref()) {
                self.headers.append(name.clone(), value);
            }
        }

        for (key, value) in defaults.query {
            self.query.entry(key).or_insert(value);
        }

        if !self.has_body() {
            self.json = defaults.json;
            self.body = defaults.body;
        }

        if self.timeout.is_none() {
            self.timeout = defaults.timeout;
        }
    }
}

pub(crate) fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::Configuration(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::Configuration(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}
