//! Error types for decorated and passthrough HTTP calls.
//!
//! Only transport-level failures surface here. Non-2xx status codes are
//! ordinary responses, and a body that fails to decode as JSON is returned as
//! text rather than raised.

/// The main error type for the crate.
///
/// # Examples
///
/// ```no_run
/// use restspeaker::{Error, NoAuth, RequestOptions, RestSpeaker};
///
/// # async fn example() -> Result<(), Error> {
/// let mut api = RestSpeaker::new(NoAuth::new(), "https://api.example.com")?;
///
/// match api.get("/endpoint", RequestOptions::new()).await {
///     Ok(body) => println!("Body: {:?}", body),
///     Err(Error::Timeout) => eprintln!("Request timed out"),
///     Err(Error::Network(e)) => eprintln!("Network error: {}", e),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed,
    /// the body could not be read, etc.).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// An invalid URL was provided, either as the base URI or as a target.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided, such as a malformed header name or
    /// value, or a client that could not be built.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request body could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    /// A JSON body could not be viewed as the requested type.
    ///
    /// Only produced by [`ResponseBody::deserialize`](crate::ResponseBody::deserialize).
    #[error("Failed to deserialize response: {serde_error}")]
    Deserialization {
        /// The raw body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
    },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

impl Error {
    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }

    /// Returns the raw response body if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Deserialization { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
