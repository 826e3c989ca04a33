//! Event payloads and event generation
//!
//! This module handles the two kinds of simulated RFID events and the logic
//! that decides which one an eligible tag produces.
//!
//! # Overview
//!
//! - **ItemMovement**: a tag moving from the absent zone into a configured zone
//! - **ThresholdCrossing**: a tag crossing a configured threshold, IN→OUT or OUT→IN
//! - **EventPayload**: either of the above, serialized as JSON for publishing
//! - **EventGenerator**: the coin flip and random selections behind each event
//!
//! # Usage Example
//!
//! ```rust
//! use rfid_tag_simulator::events::*;
//! use rfid_tag_simulator::types::*;
//!
//! let mut generator = EventGenerator::with_seed(vec!["DOCK".to_string()], Vec::new(), 42);
//! let epc = Epc::parse("AA11").unwrap();
//!
//! // Without thresholds every event is an item movement
//! let payload = generator.generate(&epc);
//! assert_eq!(payload.event_type(), EventType::Item);
//! assert!(payload.to_json().unwrap().contains("\"DOCK\""));
//! ```

pub mod generator;
pub mod payload;

// Re-export all public types for convenience
pub use generator::*;
pub use payload::*;
