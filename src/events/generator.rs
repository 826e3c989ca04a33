//! Event generation logic
//!
//! This module decides which kind of event an eligible tag produces and builds
//! the payload for it.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::events::{EventPayload, ItemMovement, ThresholdCrossing, DEFAULT_ZONE};
use crate::types::{Direction, Epc, EventType, SimulatorConfig, ThresholdDescriptor};

/// Probability that the coin flip asks for a threshold crossing
pub const THRESHOLD_PROBABILITY: f64 = 0.5;

/// Uniformly pick one element of `items`
///
/// Returns `None` for an empty slice; callers substitute their documented default.
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

/// Event generation system that creates payloads for eligible tags
#[derive(Debug)]
pub struct EventGenerator {
    /// Zone labels used as movement destinations
    zones: Vec<String>,
    /// Thresholds used for crossing events
    thresholds: Vec<ThresholdDescriptor>,
    /// Random number generator for event generation
    rng: StdRng,
}

impl EventGenerator {
    /// Create a new event generator
    pub fn new(zones: Vec<String>, thresholds: Vec<ThresholdDescriptor>, rng: StdRng) -> Self {
        info!(
            "Initializing event generator with {} zones and {} thresholds",
            zones.len(),
            thresholds.len()
        );
        Self { zones, thresholds, rng }
    }

    /// Create an event generator from the zones and thresholds of a configuration
    pub fn from_config(config: &SimulatorConfig, rng: StdRng) -> Self {
        Self::new(config.zones.clone(), config.thresholds.clone(), rng)
    }

    /// Create an event generator with a fixed seed
    pub fn with_seed(zones: Vec<String>, thresholds: Vec<ThresholdDescriptor>, seed: u64) -> Self {
        Self::new(zones, thresholds, StdRng::seed_from_u64(seed))
    }

    /// Configured zones
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    /// Configured thresholds
    pub fn thresholds(&self) -> &[ThresholdDescriptor] {
        &self.thresholds
    }

    /// Flip the event-type coin
    ///
    /// A threshold crossing is chosen only when the coin asks for one *and*
    /// at least one threshold is configured; every other outcome is an item
    /// movement.
    pub fn choose_event_type(&mut self) -> EventType {
        let wants_threshold = self.rng.gen_bool(THRESHOLD_PROBABILITY);
        if wants_threshold && !self.thresholds.is_empty() {
            EventType::Threshold
        } else {
            EventType::Item
        }
    }

    /// Generate one event for an eligible tag
    pub fn generate(&mut self, epc: &Epc) -> EventPayload {
        let payload: EventPayload = match self.choose_event_type() {
            EventType::Item => self.generate_item_movement(epc).into(),
            EventType::Threshold => self.generate_threshold_crossing(epc).into(),
        };
        debug!(epc = %epc, event_type = %payload.event_type(), "Generated event");
        payload
    }

    /// Generate an item movement into a random configured zone
    ///
    /// Falls back to [`DEFAULT_ZONE`] when no zones are configured.
    pub fn generate_item_movement(&mut self, epc: &Epc) -> ItemMovement {
        let destination = pick(&self.zones, &mut self.rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ZONE);
        ItemMovement::new(epc.clone(), destination, Utc::now())
    }

    /// Generate a crossing of a random configured threshold in a random direction
    pub fn generate_threshold_crossing(&mut self, epc: &Epc) -> ThresholdCrossing {
        let from_zone = pick(&Direction::ALL, &mut self.rng).copied().unwrap_or(Direction::In);
        let threshold = pick(&self.thresholds, &mut self.rng).cloned();
        ThresholdCrossing::new(epc.clone(), from_zone, threshold, Utc::now())
    }
}
