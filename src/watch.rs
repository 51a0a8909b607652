//! Watch Module
//!
//! Polls a house for state on a fixed interval and tracks lost contact.
//!
//! ## Behavior
//! - One GET per poll, over a connection that is reopened after any failure
//! - A poll that yields no state counts as a missed update
//! - Once more than `max_missed` updates are missed in a row, contact is lost;
//!   the last good state stays available as the fallback
//! - The next good update resets the count

use std::time::{Duration, Instant};

use crate::client::Client;
use crate::house::HouseState;

/// Default delay between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Default number of misses tolerated before contact counts as lost
pub const DEFAULT_MAX_MISSED: u32 = 6;

/// Longest single sleep inside `run`, so a stop request is noticed promptly
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// State differs from the last good one (or is the first)
    Changed(HouseState),

    /// State matches the last good one
    Unchanged(HouseState),

    /// No state this time
    Missed {
        /// Consecutive misses so far
        missed: u32,

        /// Set on the one poll where the miss limit is first exceeded
        lost_contact: bool,
    },
}

/// Periodic state poller for one house
pub struct Watcher {
    addr: String,
    timeout: Duration,
    interval: Duration,
    max_missed: u32,
    client: Option<Client>,
    last_state: Option<HouseState>,
    missed: u32,
}

impl Watcher {
    /// Create a watcher; nothing connects until the first poll
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
            max_missed: DEFAULT_MAX_MISSED,
            client: None,
            last_state: None,
            missed: 0,
        }
    }

    /// Set the delay between polls
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set how many consecutive misses are tolerated
    pub fn max_missed(mut self, count: u32) -> Self {
        self.max_missed = count;
        self
    }

    /// Poll the house once
    pub fn poll(&mut self) -> PollOutcome {
        match self.fetch() {
            Some(state) => {
                if self.is_lost() {
                    tracing::info!("Regained contact with house at {}", self.addr);
                }
                self.missed = 0;

                let changed = self.last_state != Some(state);
                self.last_state = Some(state);
                if changed {
                    PollOutcome::Changed(state)
                } else {
                    PollOutcome::Unchanged(state)
                }
            }
            None => {
                self.missed += 1;
                let lost_contact = self.missed == self.max_missed + 1;
                if lost_contact {
                    tracing::warn!(
                        "Lost contact with house at {} after {} missed updates",
                        self.addr,
                        self.missed
                    );
                }
                PollOutcome::Missed {
                    missed: self.missed,
                    lost_contact,
                }
            }
        }
    }

    /// Poll until `stop` returns true, sleeping `interval` between polls
    pub fn run<S, F>(&mut self, mut stop: S, mut on_outcome: F)
    where
        S: FnMut() -> bool,
        F: FnMut(&PollOutcome),
    {
        while !stop() {
            let outcome = self.poll();
            on_outcome(&outcome);

            let deadline = Instant::now() + self.interval;
            loop {
                let now = Instant::now();
                if now >= deadline || stop() {
                    break;
                }
                std::thread::sleep((deadline - now).min(STOP_CHECK_INTERVAL));
            }
        }
    }

    fn fetch(&mut self) -> Option<HouseState> {
        if self.client.is_none() {
            match Client::connect(self.addr.as_str(), self.timeout) {
                Ok(client) => self.client = Some(client),
                Err(e) => {
                    tracing::debug!("Could not reach house at {}: {}", self.addr, e);
                    return None;
                }
            }
        }

        let client = self.client.as_mut()?;
        match client.get_state() {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::debug!("State request to {} failed: {}", self.addr, e);
                // reconnect on the next poll
                self.client = None;
                None
            }
        }
    }

    /// Consecutive missed updates
    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// Whether the miss limit has been exceeded
    pub fn is_lost(&self) -> bool {
        self.missed > self.max_missed
    }

    /// Last state successfully read, kept across lost contact
    pub fn last_state(&self) -> Option<HouseState> {
        self.last_state
    }
}
