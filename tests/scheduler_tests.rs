//! Tests for the scheduler loop: start/stop semantics, ticking and topics
//!
//! All tests run on a paused tokio clock, so timers fire deterministically as
//! soon as every task is idle.

use async_trait::async_trait;
use rfid_tag_simulator::simulation::Simulator;
use rfid_tag_simulator::sink::{
    BrokerConnector, BrokerEndpoint, ChannelConnector, ChannelSink, PublishedMessage, SinkError,
};
use rfid_tag_simulator::types::{RunState, SimulatorConfig};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn scenario_config() -> SimulatorConfig {
    SimulatorConfig::from_json(
        r#"{
            "zones": ["A", "B"],
            "thresholds": [],
            "epcs": { "use": ["AA11"], "total": 1 },
            "tagHeartbeatDuration": 1000,
            "reportingInterval": 1000,
            "seed": 17
        }"#,
    )
    .unwrap()
}

fn drain(receiver: &mut UnboundedReceiver<PublishedMessage>) -> Vec<PublishedMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}

/// One configured tag, no thresholds: the first tick publishes one item movement
#[tokio::test(start_paused = true)]
async fn test_single_tag_first_tick() {
    let (connector, mut receiver) = ChannelConnector::new();
    let simulator = Simulator::spawn(scenario_config(), connector);

    simulator.start().unwrap();
    simulator.handle().wait_for_state(RunState::Running).await.unwrap();

    let message = receiver.recv().await.unwrap();
    assert_eq!(message.topic, "item");
    let json: Value = serde_json::from_str(&message.payload).unwrap();
    assert_eq!(json["epc"], "AA11");
    let zone = json["to"]["zone"].as_str().unwrap();
    assert!(zone == "A" || zone == "B");

    // Nothing else arrives before the next tick is due
    let next = tokio::time::timeout(Duration::from_millis(500), receiver.recv()).await;
    assert!(next.is_err());

    let statistics = simulator.shutdown().await.unwrap();
    assert_eq!(statistics.ticks, 1);
    assert_eq!(statistics.total_messages, 1);
}

/// Stopping while the connection is pending keeps the loop from ever ticking
#[tokio::test(start_paused = true)]
async fn test_stop_before_connection_prevents_ticks() {
    let (connector, gate, mut receiver) = ChannelConnector::gated();
    let simulator = Simulator::spawn(scenario_config(), connector);
    let handle = simulator.handle();

    simulator.start().unwrap();
    handle.wait_for_state(RunState::Connecting).await.unwrap();
    simulator.stop().unwrap();
    handle.wait_for_state(RunState::Stopped).await.unwrap();

    gate.notify_one();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(handle.state(), RunState::Stopped);
    assert!(drain(&mut receiver).is_empty());
    let statistics = simulator.shutdown().await.unwrap();
    assert_eq!(statistics.ticks, 0);
}

/// A second start while connecting is ignored: one connection, one tick chain
#[tokio::test(start_paused = true)]
async fn test_double_start_runs_one_chain() {
    let (connector, gate, mut receiver) = ChannelConnector::gated();
    let attempts = connector.clone();
    let simulator = Simulator::spawn(scenario_config(), connector);
    let handle = simulator.handle();

    simulator.start().unwrap();
    simulator.start().unwrap();
    handle.wait_for_state(RunState::Connecting).await.unwrap();
    gate.notify_one();
    handle.wait_for_state(RunState::Running).await.unwrap();
    simulator.start().unwrap();

    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(attempts.connection_attempts(), 1);
    assert_eq!(drain(&mut receiver).len(), 3);
    let statistics = simulator.shutdown().await.unwrap();
    assert_eq!(statistics.ticks, 3);
}

/// Prefix and suffix wrap the event type in the topic
#[tokio::test(start_paused = true)]
async fn test_topics_use_prefix_and_suffix() {
    let mut config = scenario_config();
    config.mqtt.prefix = "warehouse".to_string();
    config.mqtt.suffix = "sim".to_string();
    let (connector, mut receiver) = ChannelConnector::new();
    let simulator = Simulator::spawn(config, connector);

    simulator.start().unwrap();
    let message = receiver.recv().await.unwrap();

    assert_eq!(message.topic, "warehouse/item/sim");
    simulator.shutdown().await.unwrap();
}

/// Tags report at most once per heartbeat even when ticks are more frequent
#[tokio::test(start_paused = true)]
async fn test_heartbeat_throttles_reports() {
    let mut config = scenario_config();
    config.epcs.total = 20;
    config.tag_heartbeat_duration = 3000;
    let (connector, mut receiver) = ChannelConnector::new();
    let simulator = Simulator::spawn(config, connector);

    simulator.start().unwrap();
    // Ticks at 1s..=9s
    tokio::time::sleep(Duration::from_millis(9500)).await;
    let messages = drain(&mut receiver);
    let statistics = simulator.shutdown().await.unwrap();

    assert_eq!(statistics.ticks, 9);
    assert_eq!(statistics.identifiers, 20);
    let aa11_reports = messages.iter().filter(|m| m.payload.contains("\"AA11\"")).count();
    assert!((2..=3).contains(&aa11_reports), "{} reports", aa11_reports);
    // Every tag reports at least twice and at most three times in 9 seconds
    assert!(messages.len() >= 40 && messages.len() <= 60, "{} messages", messages.len());
}

/// The simulator can be stopped and started again
#[tokio::test(start_paused = true)]
async fn test_restart_after_stop() {
    let (connector, mut receiver) = ChannelConnector::new();
    let attempts = connector.clone();
    let simulator = Simulator::spawn(scenario_config(), connector);
    let handle = simulator.handle();

    simulator.start().unwrap();
    receiver.recv().await.unwrap();
    simulator.stop().unwrap();
    handle.wait_for_state(RunState::Stopped).await.unwrap();

    simulator.start().unwrap();
    handle.wait_for_state(RunState::Running).await.unwrap();
    receiver.recv().await.unwrap();

    assert_eq!(attempts.connection_attempts(), 2);
    let statistics = simulator.shutdown().await.unwrap();
    assert_eq!(statistics.runs, 2);
}

#[derive(Debug, Clone, Copy)]
struct RefusingConnector;

#[async_trait]
impl BrokerConnector for RefusingConnector {
    type Sink = ChannelSink;

    async fn connect(&self, endpoint: &BrokerEndpoint) -> Result<ChannelSink, SinkError> {
        Err(SinkError::Connection(format!("{} refused", endpoint.url())))
    }
}

/// A failed connection leaves the simulator connecting until stopped
#[tokio::test(start_paused = true)]
async fn test_failed_connection_stays_connecting() {
    let simulator = Simulator::spawn(scenario_config(), RefusingConnector);
    let handle = simulator.handle();

    simulator.start().unwrap();
    handle.wait_for_state(RunState::Connecting).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(handle.state(), RunState::Connecting);

    simulator.stop().unwrap();
    handle.wait_for_state(RunState::Stopped).await.unwrap();
    let statistics = simulator.shutdown().await.unwrap();
    assert_eq!(statistics.ticks, 0);
}
