//! Per-client request rate limiting
//!
//! Fixed one-minute windows keyed by client address. The table is bounded;
//! once full, unknown clients are refused until a sweep frees space.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitParams {
    pub requests_per_minute: u32,
    /// Most client addresses tracked at once
    pub max_tracked_clients: usize,
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitParams {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            max_tracked_clients: 10_000,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Rate limit exceeded, retry in {retry_after:?}")]
    Exceeded { retry_after: Duration },

    #[error("Rate limiter is tracking too many clients")]
    TableFull,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
    params: RateLimitParams,
}

impl RateLimiter {
    pub fn new(params: RateLimitParams) -> Self {
        Self {
            windows: DashMap::new(),
            params,
        }
    }

    /// Count one request from `client`. Returns the requests left in the window.
    pub fn check(&self, client: IpAddr) -> Result<u32, RateLimitError> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<u32, RateLimitError> {
        if !self.windows.contains_key(&client)
            && self.windows.len() >= self.params.max_tracked_clients
        {
            return Err(RateLimitError::TableFull);
        }

        let mut window = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }
        if window.count >= self.params.requests_per_minute {
            let retry_after = WINDOW.saturating_sub(now.duration_since(window.started));
            return Err(RateLimitError::Exceeded { retry_after });
        }
        window.count += 1;
        Ok(self.params.requests_per_minute - window.count)
    }

    /// Drop windows that have expired. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < WINDOW);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "Swept expired rate-limit windows");
        }
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Run [`RateLimiter::sweep`] periodically until `cancel` fires.
    pub fn spawn_sweeper(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let period = Duration::from_secs(self.params.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.sweep();
                    }
                }
            }
        })
    }
}
