//! # RestSpeaker - a thin REST layer over `reqwest`
//!
//! RestSpeaker decorates every outgoing call with options from a pluggable
//! authentication strategy, sends a "sticky" content type as both
//! `Content-Type` and `Accept`, remembers the last response, and decodes JSON
//! bodies when JSON is what you asked for.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restspeaker::{NoAuth, RequestOptions, ResponseBody, RestSpeaker};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restspeaker::Error> {
//!     let mut api = RestSpeaker::new(NoAuth::new(), "https://api.example.com")?;
//!
//!     // Decorated GET: JSON bodies come back decoded
//!     if let Some(body) = api.get("/users/123", RequestOptions::new()).await? {
//!         let user: User = body.deserialize()?;
//!         println!("User {}: {}", user.id, user.name);
//!     }
//!
//!     // Decorated POST: the body is sent as JSON
//!     let created = api
//!         .post("/users", &json!({"name": "Alice"}), RequestOptions::new())
//!         .await?;
//!     println!("Created: {:?}", created);
//!
//!     // Non-2xx responses are not errors; inspect the last response instead
//!     println!("Status: {:?}", api.last_status_code());
//!
//!     // Switch to plain text: bodies are returned raw from now on
//!     let text = api
//!         .set_content_type("text/plain")
//!         .get("/motd", RequestOptions::new())
//!         .await?;
//!     if let Some(ResponseBody::Text(text)) = text {
//!         println!("{}", text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Pluggable auth** - Strategies contribute default headers and query parameters
//! - **Sticky content type** - One setting drives `Content-Type`, `Accept` and JSON decoding
//! - **Last response tracking** - Status, headers and raw body of the most recent call
//! - **Raw passthrough** - The underlying [`Transport`] is one call away, undecorated
//! - **Detached dispatch** - `*_async` variants return futures that own their state
//! - **Structured logging** - `tracing` events for every request, optional curl output
//!
//! ## Authentication
//!
//! Auth options are a base layer: anything the caller sets wins.
//!
//! ```no_run
//! use restspeaker::{RequestOptions, RestSpeaker, StaticAuth};
//!
//! # async fn example() -> Result<(), restspeaker::Error> {
//! let auth = StaticAuth::bearer("secret-token")?;
//! let mut api = RestSpeaker::new(auth, "https://api.example.com")?;
//!
//! // Sent with the bearer token
//! api.get("/me", RequestOptions::new()).await?;
//!
//! // This call's own Authorization header takes precedence
//! let options = RequestOptions::new().with_header("Authorization", "Bearer other")?;
//! api.get("/me", options).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod error;
mod normalize;
mod options;
mod response;
mod speaker;
mod transport;

pub use auth::{AuthStrategy, NoAuth, StaticAuth};
pub use error::{Error, Result};
pub use normalize::{normalize, JSON_CONTENT_TYPE};
pub use options::RequestOptions;
pub use response::{RawResponse, ResponseBody};
pub use speaker::RestSpeaker;
pub use transport::{
    PendingResponse, Transport, TransportBuilder, WeakTransport, DEFAULT_RAW_CONTENT_TYPE,
    DEFAULT_USER_AGENT,
};
