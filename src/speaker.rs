//! The decorated REST client.
//!
//! [`RestSpeaker`] wraps a [`Transport`] and an [`AuthStrategy`]. Every
//! decorated call gets the strategy's options as defaults, carries the sticky
//! content type in both `Content-Type` and `Accept`, is remembered as the last
//! response, and comes back normalized: `None` for an empty body, decoded JSON
//! when JSON is expected and parses, raw text otherwise.

use crate::{
    auth::AuthStrategy,
    normalize::{normalize, JSON_CONTENT_TYPE},
    options::RequestOptions,
    response::{RawResponse, ResponseBody},
    transport::{PendingResponse, Transport},
    Error, Result,
};
use http::{header, HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

/// A REST client that injects auth options and normalizes responses.
///
/// # Examples
///
/// ```no_run
/// use restspeaker::{NoAuth, RequestOptions, RestSpeaker};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), restspeaker::Error> {
/// let mut api = RestSpeaker::new(NoAuth::new(), "https://api.example.com")?;
///
/// // JSON in, JSON out
/// let created = api
///     .post("/users", &json!({"name": "Alice"}), RequestOptions::new())
///     .await?;
/// println!("Created: {:?}", created);
/// println!("Status: {:?}", api.last_status_code());
///
/// // Sticky content type: every following call asks for PDF
/// let pdf = api
///     .set_content_type("application/pdf")
///     .get("/reports/1.pdf", RequestOptions::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RestSpeaker {
    transport: Transport,
    auth: Box<dyn AuthStrategy>,
    content_type: String,
    last_response: Option<RawResponse>,
}

impl RestSpeaker {
    /// Creates a client with a default [`Transport`].
    ///
    /// An empty `base_uri` means targets must be absolute URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URI is invalid or the HTTP client cannot
    /// be built.
    pub fn new(auth: impl AuthStrategy + 'static, base_uri: impl AsRef<str>) -> Result<Self> {
        let base_uri = base_uri.as_ref();
        let builder = Transport::builder();
        let builder = if base_uri.is_empty() {
            builder
        } else {
            builder.base_uri(base_uri)?
        };
        Ok(Self::with_transport(auth, builder.build()?))
    }

    /// Creates a client over an existing transport.
    pub fn with_transport(auth: impl AuthStrategy + 'static, transport: Transport) -> Self {
        Self {
            transport,
            auth: Box::new(auth),
            content_type: JSON_CONTENT_TYPE.to_string(),
            last_response: None,
        }
    }

    /// Sets the `Content-Type` sent with, and the `Accept` type expected from,
    /// every following decorated call.
    ///
    /// Decoding into JSON only happens while this is `application/json`.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    /// The sticky content type, `application/json` unless changed.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The response of the most recent decorated call, whatever its status.
    pub fn last_response(&self) -> Option<&RawResponse> {
        self.last_response.as_ref()
    }

    /// The status of the most recent decorated call, or `None` before the first.
    pub fn last_status_code(&self) -> Option<StatusCode> {
        self.last_response.as_ref().map(|response| response.status)
    }

    /// The strategy whose options every decorated call starts from.
    pub fn auth_strategy(&self) -> &dyn AuthStrategy {
        self.auth.as_ref()
    }

    /// Mutable access to the strategy, e.g. to rebind it.
    pub fn auth_strategy_mut(&mut self) -> &mut dyn AuthStrategy {
        self.auth.as_mut()
    }

    /// The underlying transport, for raw calls that bypass decoration.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Makes a decorated request.
    ///
    /// Auth options are merged in as defaults, `Content-Type` and `Accept` are
    /// set to the sticky content type, and the response is stored and
    /// normalized. Non-2xx responses are returned like any other.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures, or if the content
    /// type is not a valid header value.
    pub async fn call(
        &mut self,
        method: Method,
        target: impl AsRef<str>,
        mut options: RequestOptions,
    ) -> Result<Option<ResponseBody>> {
        let target = target.as_ref();
        let mut defaults = self.auth.auth_options();
        // Query keys written into the target belong to the caller too.
        if let Ok(url) = self.transport.resolve(target) {
            for (key, _) in url.query_pairs() {
                defaults.query.remove(key.as_ref());
            }
        }
        options.merge_defaults(defaults);

        let content_type = HeaderValue::try_from(self.content_type.as_str()).map_err(|e| {
            Error::Configuration(format!("Invalid content type {:?}: {}", self.content_type, e))
        })?;
        options
            .headers
            .insert(header::CONTENT_TYPE, content_type.clone());
        options.headers.insert(header::ACCEPT, content_type);

        let response = self.transport.request(method, target, options).await?;
        let body = normalize(&response, &self.content_type);
        self.last_response = Some(response);

        Ok(body)
    }

    async fn call_with_body<B>(
        &mut self,
        method: Method,
        target: impl AsRef<str>,
        body: &B,
        mut options: RequestOptions,
    ) -> Result<Option<ResponseBody>>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| Error::Serialization(e.to_string()))?;
        if !body.is_null() {
            options.json = Some(body);
        }

        self.call(method, target, options).await
    }

    /// Makes a decorated GET request.
    pub async fn get(
        &mut self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<Option<ResponseBody>> {
        self.call(Method::GET, target, options).await
    }

    /// Makes a decorated HEAD request. The result is normally `None`.
    pub async fn head(
        &mut self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<Option<ResponseBody>> {
        self.call(Method::HEAD, target, options).await
    }

    /// Makes a decorated DELETE request.
    pub async fn delete(
        &mut self,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<Option<ResponseBody>> {
        self.call(Method::DELETE, target, options).await
    }

    /// Makes a decorated PUT request with `body` sent as JSON.
    ///
    /// A body that serializes to `null`, such as `&()`, sends no body.
    ///
    /// # Errors
    ///
    /// Also returns an error if `body` cannot be serialized.
    pub async fn put<B>(
        &mut self,
        target: impl AsRef<str>,
        body: &B,
        options: RequestOptions,
    ) -> Result<Option<ResponseBody>>
    where
        B: Serialize + ?Sized,
    {
        self.call_with_body(Method::PUT, target, body, options).await
    }

    /// Makes a decorated POST request with `body` sent as JSON.
    ///
    /// A body that serializes to `null`, such as `&()`, sends no body.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restspeaker::{NoAuth, RequestOptions, RestSpeaker};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct CreateUser { name: String }
    ///
    /// # async fn example() -> Result<(), restspeaker::Error> {
    /// let mut api = RestSpeaker::new(NoAuth::new(), "https://api.example.com")?;
    ///
    /// let request = CreateUser { name: "Alice".to_string() };
    /// if let Some(body) = api.post("/users", &request, RequestOptions::new()).await? {
    ///     println!("Created: {}", body);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post<B>(
        &mut self,
        target: impl AsRef<str>,
        body: &B,
        options: RequestOptions,
    ) -> Result<Option<ResponseBody>>
    where
        B: Serialize + ?Sized,
    {
        self.call_with_body(Method::POST, target, body, options).await
    }

    /// Makes a decorated PATCH request with `body` sent as JSON.
    pub async fn patch<B>(
        &mut self,
        target: impl AsRef<str>,
        body: &B,
        options: RequestOptions,
    ) -> Result<Option<ResponseBody>>
    where
        B: Serialize + ?Sized,
    {
        self.call_with_body(Method::PATCH, target, body, options).await
    }

    /// Dispatches a prebuilt request verbatim. See [`Transport::send`].
    pub async fn send(&self, request: reqwest::Request) -> Result<RawResponse> {
        self.transport.send(request).await
    }

    /// Like [`RestSpeaker::send`], but returns a detached future.
    pub fn send_async(&self, request: reqwest::Request) -> PendingResponse {
        self.transport.send_async(request)
    }

    /// Makes an undecorated request. See [`Transport::request`].
    ///
    /// No auth options, no content type, no decoding, and the last response
    /// is left untouched.
    pub async fn request(
        &self,
        method: Method,
        target: impl AsRef<str>,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        self.transport.request(method, target, options).await
    }

    /// Like [`RestSpeaker::request`], but returns a detached future.
    pub fn request_async(
        &self,
        method: Method,
        target: impl Into<String>,
        options: RequestOptions,
    ) -> PendingResponse {
        self.transport.request_async(method, target, options)
    }

    /// Reads a transport configuration option. See [`Transport::config`].
    pub fn config(&self, key: &str) -> Option<Value> {
        self.transport.config(key)
    }

    /// Reads the whole transport configuration. See [`Transport::config_all`].
    pub fn config_all(&self) -> Map<String, Value> {
        self.transport.config_all()
    }
}
