//! Event payloads published for simulated tags
//!
//! This module contains the item movement and threshold crossing records and
//! the [`EventPayload`] wrapper handed to the publish sink.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::types::{Direction, Epc, EventType, ThresholdDescriptor};

/// Placeholder job identifier carried by every event
pub const JOB_ID: &str = "ffffffff-ffff-ffff-ffff-ffffffffffff";

/// Job name carried by item movement events
pub const ITEM_JOB_NAME: &str = "jobName";

/// Job name carried by threshold crossing events
pub const THRESHOLD_JOB_NAME: &str = "threshold_job";

/// Origin zone of every item movement
pub const ABSENT_ZONE: &str = "ABSENT";

/// Destination zone used when no zones are configured
pub const DEFAULT_ZONE: &str = "DEFAULT";

/// Facility reported for movement destinations
pub const DEFAULT_FACILITY: &str = "DEFAULT";

/// Floor reported for movement destinations
pub const DEFAULT_FLOOR: &str = "1";

/// Identifier reported for every threshold
pub const THRESHOLD_ID: u32 = 1;

/// Confidence reported for every threshold crossing
pub const THRESHOLD_CONFIDENCE: f64 = 1.0;

/// Serialize timestamps the way ISO-8601 consumers expect: UTC, millisecond precision, `Z` suffix
fn serialize_observation_time<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A position reported in an item movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonePosition {
    /// Zone label
    pub zone: String,
    /// Floor label, if known
    pub floor: Option<String>,
    /// Facility label, if known
    pub facility: Option<String>,
    /// X coordinate, if known
    pub x: Option<f64>,
    /// Y coordinate, if known
    pub y: Option<f64>,
}

impl ZonePosition {
    /// The "absent" sentinel position: no floor, facility or coordinates
    pub fn absent() -> Self {
        Self { zone: ABSENT_ZONE.to_string(), floor: None, facility: None, x: None, y: None }
    }

    /// A position in `zone` on the default floor and facility, at the origin
    pub fn located(zone: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            floor: Some(DEFAULT_FLOOR.to_string()),
            facility: Some(DEFAULT_FACILITY.to_string()),
            x: Some(0.0),
            y: Some(0.0),
        }
    }
}

/// A tag moving from the absent zone into a configured zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMovement {
    /// Tag that moved
    pub epc: Epc,
    /// Tag identifier (always empty)
    pub tag_id: String,
    /// Placeholder job identifier
    pub job_id: String,
    /// Placeholder job name
    pub job_name: String,
    /// Origin position
    pub from: ZonePosition,
    /// Destination position
    pub to: ZonePosition,
    /// When the movement was observed
    #[serde(serialize_with = "serialize_observation_time")]
    pub observation_time: DateTime<Utc>,
}

impl ItemMovement {
    /// Create a movement of `epc` from the absent zone into `destination`
    pub fn new(epc: Epc, destination: impl Into<String>, observation_time: DateTime<Utc>) -> Self {
        Self {
            epc,
            tag_id: String::new(),
            job_id: JOB_ID.to_string(),
            job_name: ITEM_JOB_NAME.to_string(),
            from: ZonePosition::absent(),
            to: ZonePosition::located(destination),
            observation_time,
        }
    }
}

/// A tag crossing a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdCrossing {
    /// Tag that crossed
    pub epc: Epc,
    /// Side the tag came from
    pub from_zone: Direction,
    /// Side the tag went to; always the opposite of `from_zone`
    pub to_zone: Direction,
    /// Threshold crossed; `None` only when no thresholds are configured
    pub threshold: Option<ThresholdDescriptor>,
    /// Threshold identifier
    pub threshold_id: u32,
    /// Detection confidence
    pub confidence: f64,
    /// Placeholder job identifier
    pub job_id: String,
    /// Placeholder job name
    pub job_name: String,
    /// When the crossing was observed
    #[serde(serialize_with = "serialize_observation_time")]
    pub observation_time: DateTime<Utc>,
}

impl ThresholdCrossing {
    /// Create a crossing of `threshold` starting on the `from_zone` side
    pub fn new(
        epc: Epc,
        from_zone: Direction,
        threshold: Option<ThresholdDescriptor>,
        observation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            epc,
            from_zone,
            to_zone: from_zone.opposite(),
            threshold,
            threshold_id: THRESHOLD_ID,
            confidence: THRESHOLD_CONFIDENCE,
            job_id: JOB_ID.to_string(),
            job_name: THRESHOLD_JOB_NAME.to_string(),
            observation_time,
        }
    }
}

/// One generated event, serialized as the bare inner record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    /// Item movement record
    ItemMovement(ItemMovement),
    /// Threshold crossing record
    ThresholdCrossing(ThresholdCrossing),
}

impl EventPayload {
    /// The event type, which also selects the topic
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::ItemMovement(_) => EventType::Item,
            EventPayload::ThresholdCrossing(_) => EventType::Threshold,
        }
    }

    /// The tag the event is about
    pub fn epc(&self) -> &Epc {
        match self {
            EventPayload::ItemMovement(event) => &event.epc,
            EventPayload::ThresholdCrossing(event) => &event.epc,
        }
    }

    /// Serialize to the JSON text handed to the publish sink
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ItemMovement> for EventPayload {
    fn from(event: ItemMovement) -> Self {
        EventPayload::ItemMovement(event)
    }
}

impl From<ThresholdCrossing> for EventPayload {
    fn from(event: ThresholdCrossing) -> Self {
        EventPayload::ThresholdCrossing(event)
    }
}
