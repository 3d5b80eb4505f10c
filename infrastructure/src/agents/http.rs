//! Shared HTTP plumbing for remote agents

use reqwest::{Client, Response, StatusCode, redirect};
use roundtable_application::AgentError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Largest response body read from a remote agent (256 KB)
pub const MAX_RESPONSE_BYTES: usize = 256 * 1024;

const USER_AGENT: &str = concat!("round-table/", env!("CARGO_PKG_VERSION"));

/// Build the client used for every remote agent call.
///
/// Redirects are never followed, so a call cannot leave the vetted host.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::none())
        .user_agent(USER_AGENT)
        .build()
}

/// One remote endpoint plus its optional bearer key
#[derive(Clone)]
pub struct AgentEndpoint {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl AgentEndpoint {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST `body` and decode the JSON reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AgentError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body).await?;
        let bytes = self.read_body(response).await?;
        serde_json::from_slice(&bytes).map_err(|e| AgentError::Malformed(e.to_string()))
    }

    /// POST `body` and require only a success status.
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> Result<(), AgentError>
    where
        B: Serialize + ?Sized,
    {
        self.post(path, body).await.map(|_| ())
    }

    /// `true` when GET `path` answers with a success status.
    pub async fn probe(&self, path: &str) -> bool {
        let mut request = self.client.get(self.url(path));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(base_url = %self.base_url, error = %e.without_url(), "Health probe failed");
                false
            }
        }
    }

    async fn post<B>(&self, path: &str, body: &B) -> Result<Response, AgentError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        check_status(response.status())?;
        Ok(response)
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, AgentError> {
        if let Some(len) = response.content_length()
            && len > MAX_RESPONSE_BYTES as u64
        {
            return Err(AgentError::Malformed(format!(
                "response of {} bytes exceeds {} bytes",
                len, MAX_RESPONSE_BYTES
            )));
        }
        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;
        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(AgentError::Malformed(format!(
                "response of {} bytes exceeds {} bytes",
                bytes.len(),
                MAX_RESPONSE_BYTES
            )));
        }
        Ok(bytes.to_vec())
    }

    fn map_error(&self, e: reqwest::Error) -> AgentError {
        if e.is_timeout() {
            AgentError::Timeout(self.timeout)
        } else {
            AgentError::Transport(e.without_url().to_string())
        }
    }
}

fn check_status(status: StatusCode) -> Result<(), AgentError> {
    if status.is_success() {
        return Ok(());
    }
    let reason = format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::TOO_MANY_REQUESTS {
        Err(AgentError::Unavailable(reason))
    } else {
        Err(AgentError::Transport(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::ACCEPTED).is_ok());
        assert!(matches!(
            check_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(AgentError::Unavailable(_))
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND),
            Err(AgentError::Transport(msg)) if msg == "HTTP 404 Not Found"
        ));
    }

    #[test]
    fn test_url_joining_and_empty_key() {
        let client = build_client(Duration::from_secs(5)).unwrap();
        let endpoint = AgentEndpoint::new(
            client,
            "https://agents.example.com/legal/",
            Some(String::new()),
            Duration::from_secs(5),
        );
        assert_eq!(endpoint.base_url(), "https://agents.example.com/legal");
        assert_eq!(endpoint.url("/analyze"), "https://agents.example.com/legal/analyze");
        assert!(!endpoint.has_api_key());
    }
}
