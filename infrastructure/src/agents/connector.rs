//! Remote agent connector
//!
//! Turns a vetted registration into an invocation handle. API keys come
//! from the environment at connect time and are never persisted.

use super::http::{AgentEndpoint, build_client};
use super::remote_http::RemoteHttpAgent;
use super::webhook::WebhookAgent;
use crate::callback::CallbackHub;
use reqwest::Client;
use roundtable_application::{Agent, AgentConnector, ConnectError};
use roundtable_domain::{InvocationMode, RemoteRegistration};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct HttpConnector {
    client: Client,
    timeout: Duration,
    hub: Option<Arc<CallbackHub>>,
    callback_ttl: Duration,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Result<Self, ConnectError> {
        let client = build_client(timeout).map_err(|e| ConnectError::Client(e.to_string()))?;
        Ok(Self {
            client,
            timeout,
            hub: None,
            callback_ttl: timeout,
        })
    }

    /// Enable webhook agents, answering through `hub` within `callback_ttl`.
    pub fn with_callbacks(mut self, hub: Arc<CallbackHub>, callback_ttl: Duration) -> Self {
        self.hub = Some(hub);
        self.callback_ttl = callback_ttl;
        self
    }

    fn endpoint(&self, registration: &RemoteRegistration) -> AgentEndpoint {
        let api_key = std::env::var(registration.api_key_env()).ok();
        debug!(
            agent = %registration.name,
            key_env = %registration.api_key_env(),
            has_key = api_key.is_some(),
            "Connecting remote agent"
        );
        AgentEndpoint::new(
            self.client.clone(),
            &registration.base_url,
            api_key,
            self.timeout,
        )
    }
}

impl AgentConnector for HttpConnector {
    fn connect(&self, registration: &RemoteRegistration) -> Result<Arc<dyn Agent>, ConnectError> {
        let endpoint = self.endpoint(registration);
        match registration.mode {
            InvocationMode::Sync => Ok(Arc::new(RemoteHttpAgent::new(
                registration.name.clone(),
                registration.domain.clone(),
                endpoint,
            ))),
            InvocationMode::Webhook => {
                let hub = self.hub.as_ref().ok_or_else(|| {
                    ConnectError::UnsupportedMode("webhook (no callback URL configured)".into())
                })?;
                Ok(Arc::new(WebhookAgent::new(
                    registration.name.clone(),
                    registration.domain.clone(),
                    endpoint,
                    Arc::clone(hub),
                    self.callback_ttl,
                )))
            }
        }
    }
}
