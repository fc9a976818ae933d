//! Per-host request pacing shared by all workers

use crate::state::HostState;
use crate::url::UrlKey;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces requests to the same host by at least `min_delay`
///
/// Slots are reserved under the lock and waited for outside it, so workers
/// targeting different hosts never block each other.
#[derive(Debug)]
pub struct HostPacer {
    min_delay: Duration,
    hosts: Mutex<HashMap<String, HostState>>,
}

impl HostPacer {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a request to `url`'s host may start
    pub async fn wait_turn(&self, url: &UrlKey) {
        if self.min_delay.is_zero() {
            return;
        }

        let host = url.host().unwrap_or_default();
        let start = {
            let mut hosts = self.hosts.lock().await;
            let state = hosts.entry(host).or_default();
            state.reserve_slot(self.min_delay, Instant::now().into_std())
        };

        tokio::time::sleep_until(Instant::from_std(start)).await;
    }

    /// Number of requests reserved for `host` so far
    pub async fn request_count(&self, host: &str) -> u32 {
        self.hosts
            .lock()
            .await
            .get(host)
            .map(|s| s.request_count)
            .unwrap_or(0)
    }
}
