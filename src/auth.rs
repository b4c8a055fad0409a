//! Pluggable authentication strategies.
//!
//! A strategy contributes a base layer of [`RequestOptions`] to every
//! decorated call. The caller's own options always take precedence.

use crate::{
    options::{parse_header, RequestOptions},
    transport::WeakTransport,
    Result,
};
use http::header;

/// Contributes authentication options to outgoing requests.
///
/// # Implementing the trait
///
/// ```
/// use restspeaker::{AuthStrategy, RequestOptions, WeakTransport};
///
/// #[derive(Default)]
/// struct ApiVersion {
///     client: WeakTransport,
/// }
///
/// impl AuthStrategy for ApiVersion {
///     fn mode(&self) -> &str {
///         "ApiVersion"
///     }
///
///     fn auth_options(&self) -> RequestOptions {
///         RequestOptions::new().with_query_param("v", "2")
///     }
///
///     fn bind_client(&mut self, client: WeakTransport) {
///         self.client = client;
///     }
/// }
/// ```
pub trait AuthStrategy: Send + Sync {
    /// A short identifier for the strategy.
    fn mode(&self) -> &str;

    /// Options merged as defaults into every decorated request.
    fn auth_options(&self) -> RequestOptions;

    /// Attaches the transport this strategy works for.
    ///
    /// The reference is weak: the strategy can reach the transport while it
    /// lives but never keeps it alive. The decorator never calls this itself.
    fn bind_client(&mut self, client: WeakTransport);
}

/// The strategy for APIs that need no authentication.
#[derive(Debug, Clone, Default)]
pub struct NoAuth {
    client: WeakTransport,
}

impl NoAuth {
    /// The value [`AuthStrategy::mode`] reports.
    pub const MODE: &'static str = "NoAuth";

    /// Creates an unbound strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strategy already bound to `client`.
    pub fn with_client(client: WeakTransport) -> Self {
        Self { client }
    }

    /// Returns the bound client, if any is set and still alive.
    pub fn client(&self) -> Option<crate::Transport> {
        self.client.upgrade()
    }
}

impl AuthStrategy for NoAuth {
    fn mode(&self) -> &str {
        Self::MODE
    }

    fn auth_options(&self) -> RequestOptions {
        RequestOptions::new()
    }

    fn bind_client(&mut self, client: WeakTransport) {
        self.client = client;
    }
}

/// A strategy contributing a fixed set of options, such as an API key header
/// or query parameter.
///
/// # Examples
///
/// ```
/// use restspeaker::{AuthStrategy, StaticAuth};
///
/// # fn main() -> Result<(), restspeaker::Error> {
/// let auth = StaticAuth::bearer("secret-token")?.with_query_param("tenant", "acme");
///
/// let options = auth.auth_options();
/// assert_eq!(options.headers["authorization"], "Bearer secret-token");
/// assert_eq!(options.query["tenant"], "acme");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    options: RequestOptions,
    client: WeakTransport,
}

impl StaticAuth {
    /// The value [`AuthStrategy::mode`] reports.
    pub const MODE: &'static str = "StaticAuth";

    /// Creates a strategy that contributes nothing until options are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value.
    pub fn bearer(token: impl AsRef<str>) -> Result<Self> {
        Self::new().with_header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Adds a header to the contributed options.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.options.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the contributed options.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.insert(key.into(), value.into());
        self
    }

    /// Returns the bound client, if any is set and still alive.
    pub fn client(&self) -> Option<crate::Transport> {
        self.client.upgrade()
    }
}

impl AuthStrategy for StaticAuth {
    fn mode(&self) -> &str {
        Self::MODE
    }

    fn auth_options(&self) -> RequestOptions {
        self.options.clone()
    }

    fn bind_client(&mut self, client: WeakTransport) {
        self.client = client;
    }
}
