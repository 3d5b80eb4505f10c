//! Pending webhook callbacks
//!
//! A webhook agent registers the callback it expects, posts the job, and
//! waits on the returned receiver. Whatever boundary receives the HTTP
//! callback hands it to [`CallbackHub::deliver`], which only releases it to
//! the waiting agent once the timestamp window and signature check out.

use super::signature::{CallbackError, DEFAULT_TOLERANCE_SECS, verify};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Signed body an agent posts back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackEnvelope {
    pub callback_id: String,
    pub payload: serde_json::Value,
}

/// One inbound callback as received by the boundary
#[derive(Debug, Clone)]
pub struct CallbackDelivery {
    pub callback_id: String,
    /// Unix seconds from the signature header
    pub timestamp: i64,
    pub signature: String,
    /// Raw request body, a serialized [`CallbackEnvelope`]
    pub body: Vec<u8>,
}

struct Pending {
    agent: String,
    expires_at: Instant,
    sender: oneshot::Sender<serde_json::Value>,
}

pub struct CallbackHub {
    secret: Vec<u8>,
    tolerance_secs: i64,
    callback_base_url: String,
    pending: DashMap<String, Pending>,
}

impl CallbackHub {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        callback_base_url: impl Into<String>,
    ) -> Result<Self, CallbackError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(CallbackError::MissingSecret);
        }
        Ok(Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            callback_base_url: callback_base_url.into().trim_end_matches('/').to_string(),
            pending: DashMap::new(),
        })
    }

    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs.max(0);
        self
    }

    pub fn tolerance_secs(&self) -> i64 {
        self.tolerance_secs
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Register a callback for `agent` that stays open for `ttl`.
    ///
    /// Dropping the returned handle withdraws the callback.
    pub fn expect(self: &Arc<Self>, agent: &str, ttl: Duration) -> PendingCallback {
        let id = Uuid::new_v4().to_string();
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(
            id.clone(),
            Pending {
                agent: agent.to_string(),
                expires_at: Instant::now() + ttl,
                sender,
            },
        );
        debug!(agent, callback_id = %id, "Callback expected");
        PendingCallback {
            url: format!("{}/{}", self.callback_base_url, id),
            id,
            receiver: Some(receiver),
            hub: Arc::clone(self),
        }
    }

    pub fn deliver(&self, delivery: &CallbackDelivery) -> Result<(), CallbackError> {
        self.deliver_at(delivery, Utc::now().timestamp(), Instant::now())
    }

    /// Verify and route a callback.
    ///
    /// A delivery that fails verification leaves the pending callback in
    /// place.
    pub fn deliver_at(
        &self,
        delivery: &CallbackDelivery,
        now_unix: i64,
        now: Instant,
    ) -> Result<(), CallbackError> {
        let id = delivery.callback_id.as_str();
        let expired = match self.pending.get(id) {
            None => return Err(CallbackError::UnknownCallback(id.to_string())),
            Some(pending) => pending.expires_at <= now,
        };
        if expired {
            self.pending.remove(id);
            return Err(CallbackError::Expired(id.to_string()));
        }

        if let Err(e) = verify(
            &self.secret,
            delivery.timestamp,
            &delivery.body,
            &delivery.signature,
            now_unix,
            self.tolerance_secs,
        ) {
            warn!(callback_id = id, error = %e, "Callback rejected");
            return Err(e);
        }

        let envelope: CallbackEnvelope = serde_json::from_slice(&delivery.body)
            .map_err(|e| CallbackError::Malformed(e.to_string()))?;
        if envelope.callback_id != id {
            return Err(CallbackError::Malformed(
                "callback id does not match the signed body".into(),
            ));
        }

        let Some((_, pending)) = self.pending.remove(id) else {
            return Err(CallbackError::UnknownCallback(id.to_string()));
        };
        debug!(agent = %pending.agent, callback_id = id, "Callback delivered");
        if pending.sender.send(envelope.payload).is_err() {
            debug!(callback_id = id, "Callback receiver already gone");
        }
        Ok(())
    }

    /// Drop expired callbacks; returns how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, p| p.expires_at > now);
        before.saturating_sub(self.pending.len())
    }

    fn withdraw(&self, id: &str) {
        self.pending.remove(id);
    }
}

/// A callback the hub is holding open
pub struct PendingCallback {
    pub id: String,
    pub url: String,
    receiver: Option<oneshot::Receiver<serde_json::Value>>,
    hub: Arc<CallbackHub>,
}

impl PendingCallback {
    /// Wait for the verified payload.
    pub async fn wait(mut self) -> Result<serde_json::Value, CallbackError> {
        let receiver = self
            .receiver
            .take()
            .ok_or_else(|| CallbackError::UnknownCallback(self.id.clone()))?;
        receiver
            .await
            .map_err(|_| CallbackError::Expired(self.id.clone()))
    }
}

impl Drop for PendingCallback {
    fn drop(&mut self) {
        self.hub.withdraw(&self.id);
    }
}
