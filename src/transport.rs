//! The raw HTTP layer.
//!
//! [`Transport`] is a cheap, cloneable handle over a `reqwest::Client`. It
//! resolves targets against a base URI, applies client-level default headers,
//! buffers responses into [`RawResponse`]s and exposes its configuration by
//! option name. It never looks at status codes or decodes bodies: that is the
//! job of [`RestSpeaker`](crate::RestSpeaker).

use crate::{
    options::{parse_header, RequestOptions},
    response::RawResponse,
    Result,
};
use http::{header, HeaderMap, HeaderValue, Method};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use url::Url;

/// User agent sent on every request built by a [`Transport`].
pub const DEFAULT_USER_AGENT: &str = concat!("restspeaker/", env!("CARGO_PKG_VERSION"));

/// Content type of raw requests that carry no JSON body.
pub const DEFAULT_RAW_CONTENT_TYPE: &str = "text/html";

/// A response that has been dispatched but not awaited yet.
///
/// The future owns everything it needs, so it can be stored, spawned onto a
/// runtime or awaited later.
pub type PendingResponse = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send + 'static>>;

/// A handle to the underlying HTTP client and its configuration.
///
/// # Examples
///
/// ```no_run
/// use restspeaker::{RequestOptions, Transport};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), restspeaker::Error> {
/// let transport = Transport::builder()
///     .base_uri("https://api.example.com/v1/")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// // Awaited in place
/// let response = transport.get("users/123", RequestOptions::new()).await?;
/// println!("Status: {}", response.status);
///
/// // Dispatched now, awaited later
/// let pending = transport.get_async("users/456", RequestOptions::new());
/// let response = pending.await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Transport {
    inner: Arc<TransportInner>,
}

#[derive(Debug)]
struct TransportInner {
    http_client: reqwest::Client,
    base_uri: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    log_curl: bool,
}

impl Transport {
    /// Creates a new `TransportBuilder`.
    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }

    /// Creates a transport with default settings and no base URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        TransportBuilder::new().build()
    }

    /// Returns the base URI relative targets are resolved against.
    pub fn base_uri(&self) -> Option<&Url> {
        self.inner.base_uri.as_ref()
    }

    /// Returns a weak handle to this transport.
    pub fn downgrade(&self) -> WeakTransport {
        WeakTransport {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Builds and dispatches a request, returning the buffered response.
    ///
    /// Any status code is a successful outcome here. Only transport-level
    /// failures are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be resolved, a header is invalid,
    /// or the request fails at the network level.
    pub async fn request(
        &self,
        method: Method,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        let request = self.build_request(method, target.as_ref(), options)?;
        self.dispatch(request).await
    }

    /// Like [`Transport::request`], but returns a detached future.
    pub fn request_async(
        &self,
        method: Method,
        target: impl Into<String>,
        options: RequestOptions,
    ) -> PendingResponse {
        let transport = self.clone();
        let target = target.into();
        Box::pin(async move { transport.request(method, target, options).await })
    }

    /// Dispatches a prebuilt request exactly as given.
    ///
    /// No base URI resolution and no default headers are applied.
    pub async fn send(&self, request: reqwest::Request) -> Result<RawResponse> {
        self.dispatch(request).await
    }

    /// Like [`Transport::send`], but returns a detached future.
    pub fn send_async(&self, request: reqwest::Request) -> PendingResponse {
        let transport = self.clone();
        Box::pin(async move { transport.dispatch(request).await })
    }

    /// Makes a GET request.
    pub async fn get(
        &self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.request(Method::GET, target, options).await
    }

    /// Makes a HEAD request.
    pub async fn head(
        &self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.request(Method::HEAD, target, options).await
    }

    /// Makes a DELETE request.
    pub async fn delete(
        &self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.request(Method::DELETE, target, options).await
    }

    /// Makes a PUT request. The body, if any, travels in `options`.
    pub async fn put(
        &self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.request(Method::PUT, target, options).await
    }

    /// Makes a POST request. The body, if any, travels in `options`.
    pub async fn post(
        &self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.request(Method::POST, target, options).await
    }

    /// Makes a PATCH request. The body, if any, travels in `options`.
    pub async fn patch(
        &self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.request(Method::PATCH, target, options).await
    }

    /// Like [`Transport::get`], but returns a detached future.
    pub fn get_async(&self, target: impl Into<String>, options: RequestOptions) -> PendingResponse {
        self.request_async(Method::GET, target, options)
    }

    /// Like [`Transport::head`], but returns a detached future.
    pub fn head_async(&self, target: impl Into<String>, options: RequestOptions) -> PendingResponse {
        self.request_async(Method::HEAD, target, options)
    }

    /// Like [`Transport::delete`], but returns a detached future.
    pub fn delete_async(
        &self,
        target: impl Into<String>,
        options: RequestOptions,
    ) -> PendingResponse {
        self.request_async(Method::DELETE, target, options)
    }

    /// Like [`Transport::put`], but returns a detached future.
    pub fn put_async(&self, target: impl Into<String>, options: RequestOptions) -> PendingResponse {
        self.request_async(Method::PUT, target, options)
    }

    /// Like [`Transport::post`], but returns a detached future.
    pub fn post_async(&self, target: impl Into<String>, options: RequestOptions) -> PendingResponse {
        self.request_async(Method::POST, target, options)
    }

    /// Like [`Transport::patch`], but returns a detached future.
    pub fn patch_async(
        &self,
        target: impl Into<String>,
        options: RequestOptions,
    ) -> PendingResponse {
        self.request_async(Method::PATCH, target, options)
    }

    /// Returns a single configuration option by name.
    ///
    /// Known keys are `base_uri`, `timeout`, `connect_timeout` (seconds),
    /// `user_agent`, `headers`, `log_curl` and `http_errors`. Unknown or unset
    /// options return `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use restspeaker::Transport;
    /// use std::time::Duration;
    ///
    /// # fn main() -> Result<(), restspeaker::Error> {
    /// let transport = Transport::builder()
    ///     .base_uri("https://api.example.com/")?
    ///     .timeout(Duration::from_secs(30))
    ///     .build()?;
    ///
    /// assert_eq!(transport.config("base_uri").unwrap(), "https://api.example.com/");
    /// assert_eq!(transport.config("timeout").unwrap(), 30.0);
    /// assert!(transport.config("non_existent_option").is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn config(&self, key: &str) -> Option<Value> {
        self.config_all().remove(key).filter(|value| !value.is_null())
    }

    /// Returns the full configuration as a JSON object.
    pub fn config_all(&self) -> Map<String, Value> {
        let inner = &self.inner;
        let headers: Map<String, Value> = inner
            .default_headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), Value::from(value)))
            })
            .collect();
        let user_agent = inner
            .default_headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok());

        let mut config = Map::new();
        config.insert(
            "base_uri".to_string(),
            inner.base_uri.as_ref().map(Url::as_str).into(),
        );
        config.insert(
            "timeout".to_string(),
            inner.timeout.map(|t| t.as_secs_f64()).into(),
        );
        config.insert(
            "connect_timeout".to_string(),
            inner.connect_timeout.map(|t| t.as_secs_f64()).into(),
        );
        config.insert("user_agent".to_string(), user_agent.into());
        config.insert("headers".to_string(), Value::Object(headers));
        config.insert("log_curl".to_string(), inner.log_curl.into());
        config.insert("http_errors".to_string(), false.into());
        config
    }

    pub(crate) fn resolve(&self, target: &str) -> Result<Url> {
        match &self.inner.base_uri {
            Some(base) => Ok(base.join(target)?),
            None => Ok(Url::parse(target)?),
        }
    }

    fn build_request(
        &self,
        method: Method,
        target: &str,
        options: RequestOptions,
    ) -> Result<reqwest::Request> {
        let RequestOptions {
            mut headers,
            query,
            json,
            body,
            timeout,
        } = options;

        let mut url = self.resolve(target)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query {
                pairs.append_pair(key, value);
            }
        }

        if json.is_some() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        for (name, value) in &self.inner.default_headers {
            if !headers.contains_key(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .headers(headers);

        if let Some(json) = json {
            request = request.json(&json);
        } else if let Some(body) = body {
            request = request.body(body);
        }

        if let Some(timeout) = timeout.or(self.inner.timeout) {
            request = request.timeout(timeout);
        }

        Ok(request.build()?)
    }

    async fn dispatch(&self, request: reqwest::Request) -> Result<RawResponse> {
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!(method = %method, url = %url, "Executing HTTP request");
        if self.inner.log_curl {
            tracing::debug!(curl = %curl_command(&request), "HTTP request as curl");
        }

        let start_time = Instant::now();
        let response = match self.inner.http_client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, method = %method, url = %url, "Request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response.bytes().await?.to_vec();
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        Ok(RawResponse::new(status, headers, final_url, body, latency))
    }
}

/// A non-owning reference to a [`Transport`].
///
/// Auth strategies hold one of these so they can reach the transport they
/// are attached to without keeping it alive.
#[derive(Clone, Debug, Default)]
pub struct WeakTransport {
    inner: Weak<TransportInner>,
}

impl WeakTransport {
    /// Creates a reference that never upgrades.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transport if it is still alive.
    pub fn upgrade(&self) -> Option<Transport> {
        self.inner.upgrade().map(|inner| Transport { inner })
    }
}

/// Renders a request as an equivalent `curl` command line.
fn curl_command(request: &reqwest::Request) -> String {
    let mut parts = vec!["curl".to_string()];

    if *request.method() == Method::HEAD {
        parts.push("--head".to_string());
    } else if *request.method() != Method::GET {
        parts.push(format!("-X {}", request.method()));
    }

    for (name, value) in request.headers() {
        let line = format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        parts.push(format!("-H {}", shell_quote(&line)));
    }

    if let Some(body) = request.body().and_then(|body| body.as_bytes()) {
        parts.push(format!("-d {}", shell_quote(&String::from_utf8_lossy(body))));
    }

    parts.push(shell_quote(request.url().as_str()));
    parts.join(" ")
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Builder for configuring and creating a [`Transport`].
///
/// # Examples
///
/// ```no_run
/// use restspeaker::TransportBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restspeaker::Error> {
/// let transport = TransportBuilder::new()
///     .base_uri("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("X-Client", "my-app/1.0")?
///     .log_curl(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TransportBuilder {
    base_uri: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    log_curl: bool,
    http_client: Option<reqwest::Client>,
}

impl TransportBuilder {
    /// Creates a new `TransportBuilder` with default settings.
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_USER_AGENT),
        );
        default_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(DEFAULT_RAW_CONTENT_TYPE),
        );

        Self {
            base_uri: None,
            default_headers,
            timeout: None,
            connect_timeout: None,
            log_curl: false,
            http_client: None,
        }
    }

    /// Sets the base URI relative targets are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_uri(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_uri = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a header included in every request built from options.
    ///
    /// Headers set per call take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Replaces the default user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid header value.
    pub fn user_agent(self, user_agent: impl AsRef<str>) -> Result<Self> {
        self.default_header(header::USER_AGENT.as_str(), user_agent)
    }

    /// Sets the request timeout.
    ///
    /// Applied to each request unless its options carry their own, including
    /// requests sent through a client supplied with
    /// [`TransportBuilder::with_client`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    ///
    /// Has no effect when a client is supplied with
    /// [`TransportBuilder::with_client`].
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Logs every dispatched request as a `curl` command at `debug` level.
    pub fn log_curl(mut self, enabled: bool) -> Self {
        self.log_curl = enabled;
        self
    }

    /// Uses a preconfigured `reqwest::Client` instead of building one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the configured `Transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<Transport> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(|e| {
                    crate::Error::Configuration(format!("Failed to build HTTP client: {}", e))
                })?
            }
        };

        Ok(Transport {
            inner: Arc::new(TransportInner {
                http_client,
                base_uri: self.base_uri,
                default_headers: self.default_headers,
                timeout: self.timeout,
                connect_timeout: self.connect_timeout,
                log_curl: self.log_curl,
            }),
        })
    }
}

impl Default for TransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
