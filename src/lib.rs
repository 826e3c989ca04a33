//! RFID Tag Simulator
//!
//! Generates synthetic RFID tag activity for an item-tracking deployment and
//! publishes it periodically to a message broker, standing in for a real sensor
//! network when testing consumers of the event stream.
//!
//! # Overview
//!
//! A configured population of tags (EPCs) is checked on every reporting tick.
//! Each tag whose heartbeat has elapsed produces one event, either an item
//! movement into a zone or a crossing of a threshold, which is serialized as
//! JSON and handed to a publish sink under `{prefix}/{eventType}/{suffix}`.
//!
//! ## Key Features
//!
//! - **Identifier Pool**: configured EPCs padded with unique random ones
//! - **Heartbeat Scheduling**: per-tag throttling with randomized first reports
//! - **Event Generation**: item movements and threshold crossings in the tracking wire format
//! - **Pluggable Sinks**: MQTT, stdout, or an in-process channel
//! - **Reproducible Runs**: an optional seed fixes every random choice
//!
//! ## Quick Start
//!
//! ```rust
//! use rfid_tag_simulator::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SimulatorConfig::from_json(
//!     r#"{ "zones": ["DOCK"], "epcs": { "use": ["AA11"], "total": 2 } }"#,
//! )?;
//! config.validate()?;
//!
//! let (connector, mut messages) = ChannelConnector::new();
//! let simulator = Simulator::spawn(config, connector);
//! simulator.start()?;
//!
//! let message = messages.recv().await.expect("first event");
//! assert_eq!(message.topic, "item");
//!
//! let statistics = simulator.shutdown().await?;
//! assert_eq!(statistics.identifiers, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums and configuration
//! - [`events`]: event payloads and the event generator
//! - [`simulation`]: identifier pool, heartbeats, state machine and scheduler
//! - [`sink`]: publish sinks and broker connectors
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

pub mod events;
pub mod simulation;
pub mod sink;
pub mod types;

// Core types and configuration
pub use types::{
    CliArgs, ConfigError, ConfigValidationError, Direction, Epc, EpcConfig, EventType, MqttConfig,
    RunState, SimulatorConfig, ThresholdDescriptor,
};

// Event types and functionality
pub use events::{EventGenerator, EventPayload, ItemMovement, ThresholdCrossing};

// Simulation types and functionality
pub use simulation::{
    HeartbeatTracker, IdentifierPool, LoggingConfig, SimulationError, SimulationResult,
    SimulationState, SimulationStatistics, Simulator, SimulatorHandle, TickReport, TopicBuilder,
};

// Publish sinks
pub use sink::{
    BrokerConnector, BrokerEndpoint, ChannelConnector, MqttConnector, PublishSink,
    PublishedMessage, SinkError, StdoutConnector,
};
