//! Statistics collection and reporting
//!
//! A [`TickReport`] describes one tick; [`SimulationStatistics`] accumulates
//! them over the lifetime of a simulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::EventType;

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// Messages accepted by the sink
    pub messages_sent: usize,
    /// Item movement events accepted by the sink
    pub item_events: usize,
    /// Threshold crossing events accepted by the sink
    pub threshold_events: usize,
    /// Events the sink refused or failed to take
    pub publish_failures: usize,
}

impl TickReport {
    /// Count an event the sink accepted
    pub fn record_sent(&mut self, event_type: EventType) {
        self.messages_sent += 1;
        match event_type {
            EventType::Item => self.item_events += 1,
            EventType::Threshold => self.threshold_events += 1,
        }
    }

    /// Count an event the sink did not accept
    pub fn record_failure(&mut self) {
        self.publish_failures += 1;
    }

    /// Eligible tags seen this tick
    pub fn attempted(&self) -> usize {
        self.messages_sent + self.publish_failures
    }
}

/// Cumulative statistics for a simulator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationStatistics {
    /// Size of the identifier pool
    pub identifiers: usize,
    /// Ticks executed while running
    pub ticks: u64,
    /// Messages accepted by the sink
    pub total_messages: u64,
    /// Item movement events accepted by the sink
    pub item_events: u64,
    /// Threshold crossing events accepted by the sink
    pub threshold_events: u64,
    /// Events the sink did not accept
    pub publish_failures: u64,
    /// Number of times the simulator entered the running state
    pub runs: u64,
    /// First transition to running
    pub started_at: Option<DateTime<Utc>>,
    /// Last stop
    pub stopped_at: Option<DateTime<Utc>>,
}

impl SimulationStatistics {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick into the totals
    pub fn record_tick(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.total_messages += report.messages_sent as u64;
        self.item_events += report.item_events as u64;
        self.threshold_events += report.threshold_events as u64;
        self.publish_failures += report.publish_failures as u64;
    }

    /// Record a transition to running
    pub fn record_run_started(&mut self, at: DateTime<Utc>) {
        self.runs += 1;
        self.started_at.get_or_insert(at);
    }

    /// Record a stop
    pub fn record_stopped(&mut self, at: DateTime<Utc>) {
        self.stopped_at = Some(at);
    }

    /// Share of sent messages that were threshold crossings, in percent
    pub fn threshold_percentage(&self) -> f64 {
        if self.total_messages == 0 {
            0.0
        } else {
            (self.threshold_events as f64 / self.total_messages as f64) * 100.0
        }
    }

    /// Average messages per tick
    pub fn average_messages_per_tick(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.total_messages as f64 / self.ticks as f64
        }
    }
}

impl fmt::Display for SimulationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Statistics:")?;
        writeln!(f, "  Identifiers: {}", self.identifiers)?;
        writeln!(f, "  Ticks: {}", self.ticks)?;
        writeln!(
            f,
            "  Messages Sent: {} ({:.2} per tick)",
            self.total_messages,
            self.average_messages_per_tick()
        )?;
        writeln!(f, "  Item Events: {}", self.item_events)?;
        writeln!(
            f,
            "  Threshold Events: {} ({:.1}%)",
            self.threshold_events,
            self.threshold_percentage()
        )?;
        write!(f, "  Publish Failures: {}", self.publish_failures)?;
        if let Some(started_at) = self.started_at {
            write!(f, "\n  Started: {}", started_at.to_rfc3339())?;
        }
        if let Some(stopped_at) = self.stopped_at {
            write!(f, "\n  Stopped: {}", stopped_at.to_rfc3339())?;
        }
        Ok(())
    }
}
