//! Raw responses and their normalized bodies.
//!
//! A [`RawResponse`] is what the transport hands back: status, headers and the
//! fully buffered body. A [`ResponseBody`] is what the decorator makes of it.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::{Error, Result};

/// A fully read HTTP response.
///
/// The body is buffered so the response can be kept around as the "last
/// response" and normalized any number of times.
///
/// # Examples
///
/// ```no_run
/// use restspeaker::{RequestOptions, Transport};
///
/// # async fn example() -> Result<(), restspeaker::Error> {
/// let transport = Transport::builder()
///     .base_uri("https://api.example.com")?
///     .build()?;
///
/// let response = transport.get("/users/123", RequestOptions::new()).await?;
/// println!("Status: {}", response.status);
/// println!("Took {:?}", response.latency);
/// println!("Body: {}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The final URL, after redirects.
    pub url: Url,

    /// The raw body bytes.
    pub body: Vec<u8>,

    /// Time from dispatch until the body was fully read.
    pub latency: Duration,
}

impl RawResponse {
    /// Creates a new `RawResponse`.
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        url: Url,
        body: impl Into<Vec<u8>>,
        latency: Duration,
    ) -> Self {
        Self {
            status,
            headers,
            url,
            body: body.into(),
            latency,
        }
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns `true` if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns `true` for 2xx status codes.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restspeaker::RawResponse;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = RawResponse::new(
    ///     StatusCode::OK,
    ///     headers,
    ///     "https://api.example.com/".parse().unwrap(),
    ///     "{}",
    ///     Duration::from_millis(10),
    /// );
    ///
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// A normalized response body.
///
/// JSON bodies are decoded when the expected content type is
/// `application/json`; everything else is handed back as text.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// A decoded JSON value (object, array or scalar).
    Json(serde_json::Value),

    /// The raw body, undecoded.
    Text(String),
}

impl ResponseBody {
    /// Returns `true` for decoded JSON.
    pub fn is_json(&self) -> bool {
        matches!(self, ResponseBody::Json(_))
    }

    /// Returns the decoded JSON value, if any.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Returns the raw text, if the body was not decoded.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// Views a JSON body as a typed value.
    ///
    /// A text body is parsed on the spot, so a body that was kept raw because
    /// of a non-JSON content type can still be read as JSON on request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`] if the body does not fit `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use restspeaker::ResponseBody;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User { name: String }
    ///
    /// let body = ResponseBody::Json(serde_json::json!({"name": "Alice"}));
    /// let user: User = body.deserialize().unwrap();
    /// assert_eq!(user.name, "Alice");
    /// ```
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let parsed = match self {
            ResponseBody::Json(value) => T::deserialize(value),
            ResponseBody::Text(text) => serde_json::from_str(text),
        };
        parsed.map_err(|e| Error::Deserialization {
            raw_response: self.to_string(),
            serde_error: e.to_string(),
        })
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        hello: String,
    }

    #[test]
    fn test_text_is_lossy() {
        let response = RawResponse::new(
            StatusCode::OK,
            HeaderMap::new(),
            "http://localhost/".parse().unwrap(),
            vec![b'o', b'k', 0xff],
            Duration::ZERO,
        );
        assert_eq!(response.text(), "ok\u{fffd}");
        assert!(!response.is_empty());
        assert!(response.is_success());
    }

    #[test]
    fn test_deserialize_json_body() {
        let body = ResponseBody::Json(json!({"hello": "world"}));
        let greeting: Greeting = body.deserialize().unwrap();
        assert_eq!(greeting.hello, "world");
        assert!(body.is_json());
        assert_eq!(body.as_text(), None);
    }

    #[test]
    fn test_deserialize_text_body() {
        let body = ResponseBody::Text(r#"{"hello":"text"}"#.to_string());
        let greeting: Greeting = body.deserialize().unwrap();
        assert_eq!(greeting.hello, "text");
    }

    #[test]
    fn test_deserialize_failure_keeps_raw() {
        let body = ResponseBody::Text("<html/>".to_string());
        match body.deserialize::<Greeting>() {
            Err(Error::Deserialization { raw_response, .. }) => {
                assert_eq!(raw_response, "<html/>");
            }
            other => panic!("Expected Deserialization, got {:?}", other),
        }
    }
}
