//! Per-tag heartbeat tracking
//!
//! Each tag has a next-eligible instant. A tag may report once that instant
//! has been reached, after which the instant moves one heartbeat forward.

use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::types::Epc;

/// Next-eligible report instant for every pooled tag
#[derive(Debug, Clone, Default)]
pub struct HeartbeatTracker {
    next_eligible: HashMap<Epc, Instant>,
}

impl HeartbeatTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the tracker and spread the first reports of `identifiers`
    /// uniformly over `[now, now + duration)`
    pub fn initialize<'a, I, R>(
        &mut self,
        identifiers: I,
        duration: Duration,
        now: Instant,
        rng: &mut R,
    ) where
        I: IntoIterator<Item = &'a Epc>,
        R: Rng + ?Sized,
    {
        self.next_eligible.clear();
        let window = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        for epc in identifiers {
            let offset = if window == 0 { 0 } else { rng.gen_range(0..window) };
            self.next_eligible.insert(epc.clone(), now + Duration::from_millis(offset));
        }
    }

    /// Whether `epc` may report at `now`; unknown tags never may
    pub fn is_eligible(&self, epc: &Epc, now: Instant) -> bool {
        self.next_eligible.get(epc).map_or(false, |next| now >= *next)
    }

    /// Record a report at `now`, pushing the next one `duration` ahead
    ///
    /// Unknown tags are ignored.
    pub fn mark_reported(&mut self, epc: &Epc, now: Instant, duration: Duration) {
        if let Some(next) = self.next_eligible.get_mut(epc) {
            *next = now + duration;
        }
    }

    /// Next-eligible instant of `epc`
    pub fn next_eligible(&self, epc: &Epc) -> Option<Instant> {
        self.next_eligible.get(epc).copied()
    }

    /// Number of tracked tags
    pub fn len(&self) -> usize {
        self.next_eligible.len()
    }

    /// Whether no tag is tracked
    pub fn is_empty(&self) -> bool {
        self.next_eligible.is_empty()
    }
}
