//! Remote agent adapters
//!
//! - [`RemoteHttpAgent`] answers each call in the HTTP response
//! - [`WebhookAgent`] acknowledges a job and answers through a signed callback
//! - [`HttpConnector`] builds either from a vetted registration

pub mod connector;
pub mod http;
pub mod remote_http;
pub mod webhook;

pub use connector::HttpConnector;
pub use http::{AgentEndpoint, MAX_RESPONSE_BYTES};
pub use remote_http::RemoteHttpAgent;
pub use webhook::WebhookAgent;
