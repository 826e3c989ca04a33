//! Enumeration types for the RFID tag simulator
//!
//! This module contains the event types, crossing directions, run states and
//! threshold descriptors used throughout the simulation system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of event produced for an eligible tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Item movement from the absent zone into a configured zone
    Item,
    /// Threshold crossing in one of two directions
    Threshold,
}

impl EventType {
    /// Topic segment for this event type
    pub fn topic_segment(&self) -> &'static str {
        match self {
            EventType::Item => "item",
            EventType::Threshold => "threshold",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic_segment())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "item" => Ok(EventType::Item),
            "threshold" => Ok(EventType::Threshold),
            _ => Err(format!("Unknown event type: {}", s)),
        }
    }
}

/// Side of a threshold a tag is observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Inside the threshold
    In,
    /// Outside the threshold
    Out,
}

impl Direction {
    /// Both directions, in a fixed order
    pub const ALL: [Direction; 2] = [Direction::In, Direction::Out];

    /// The other side of the threshold
    pub fn opposite(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    /// Wire label of the direction
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Not running; the initial state
    #[default]
    Stopped,
    /// Started, waiting for the publish sink to connect
    Connecting,
    /// Connected and ticking
    Running,
}

impl RunState {
    /// Whether ticks are currently processed
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Stopped => write!(f, "Stopped"),
            RunState::Connecting => write!(f, "Connecting"),
            RunState::Running => write!(f, "Running"),
        }
    }
}

/// A configured threshold (doorway) that tags can be seen crossing
///
/// Both configuration schema variants are accepted: an `{"in": .., "out": ..}`
/// pair of boundary labels, or a single threshold name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdDescriptor {
    /// Pair of zone labels on either side of the threshold
    Pair {
        /// Label of the inner side
        #[serde(rename = "in")]
        inside: String,
        /// Label of the outer side
        #[serde(rename = "out")]
        outside: String,
    },
    /// A single threshold name
    Named(String),
}

impl ThresholdDescriptor {
    /// Create a pair descriptor
    pub fn pair(inside: impl Into<String>, outside: impl Into<String>) -> Self {
        ThresholdDescriptor::Pair { inside: inside.into(), outside: outside.into() }
    }

    /// Create a named descriptor
    pub fn named(name: impl Into<String>) -> Self {
        ThresholdDescriptor::Named(name.into())
    }

    /// Whether every label in the descriptor is non-empty
    pub fn is_well_formed(&self) -> bool {
        match self {
            ThresholdDescriptor::Pair { inside, outside } => {
                !inside.trim().is_empty() && !outside.trim().is_empty()
            }
            ThresholdDescriptor::Named(name) => !name.trim().is_empty(),
        }
    }
}

impl fmt::Display for ThresholdDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdDescriptor::Pair { inside, outside } => write!(f, "{}/{}", inside, outside),
            ThresholdDescriptor::Named(name) => f.write_str(name),
        }
    }
}
