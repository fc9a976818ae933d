use std::time::{Duration, Instant};

/// Tracks the request pacing of one host during a run
///
/// Every request to a host must start at least `min_delay` after the previous
/// one, no matter which worker issues it.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests issued to this host
    pub request_count: u32,

    /// Start time of the most recent (or most recently reserved) request
    pub last_request_time: Option<Instant>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a request started at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let ready_at = last + min_delay;
        if ready_at > now {
            Some(ready_at - now)
        } else {
            None
        }
    }

    /// Reserves the earliest start time allowed for the next request
    ///
    /// The reservation is recorded immediately, so a second caller gets a slot
    /// one `min_delay` later even before the first request has started.
    pub fn reserve_slot(&mut self, min_delay: Duration, now: Instant) -> Instant {
        let start = match self.time_until_next_request(min_delay, now) {
            Some(wait) => now + wait,
            None => now,
        };
        self.record_request(start);
        start
    }
}
