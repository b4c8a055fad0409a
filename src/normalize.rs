//! Turns raw responses into the value a decorated call returns.

use crate::response::{RawResponse, ResponseBody};

/// The content type that enables JSON decoding.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Normalizes a raw response for the given expected content type.
///
/// - An empty body yields `None`.
/// - With a content type of exactly `application/json`, a body that parses as
///   JSON yields [`ResponseBody::Json`].
/// - Anything else, including malformed JSON, yields the body as
///   [`ResponseBody::Text`]. JSON nested deeper than `serde_json`'s recursion
///   limit of 128 levels does not decode and also comes back as text.
///
/// # Examples
///
/// ```
/// use restspeaker::{normalize, RawResponse, ResponseBody};
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// let response = RawResponse::new(
///     StatusCode::OK,
///     HeaderMap::new(),
///     "https://api.example.com/".parse().unwrap(),
///     r#"{"a":1}"#,
///     Duration::ZERO,
/// );
///
/// assert_eq!(
///     normalize(&response, "application/json"),
///     Some(ResponseBody::Json(serde_json::json!({"a": 1})))
/// );
/// assert_eq!(
///     normalize(&response, "text/plain"),
///     Some(ResponseBody::Text(r#"{"a":1}"#.to_string()))
/// );
/// ```
pub fn normalize(response: &RawResponse, content_type: &str) -> Option<ResponseBody> {
    if response.is_empty() {
        return None;
    }

    if content_type == JSON_CONTENT_TYPE {
        match serde_json::from_slice(&response.body) {
            Ok(value) => return Some(ResponseBody::Json(value)),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    status = response.status.as_u16(),
                    "Body is not valid JSON, returning raw text"
                );
            }
        }
    }

    Some(ResponseBody::Text(response.text()))
}
