// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use rfid_tag_simulator::*;

#[test]
fn test_crate_root_exports() {
    let epc: Epc = "0a1b".parse().unwrap();
    assert_eq!(epc.to_string(), "0A1B");

    assert_eq!(EventType::Item.to_string(), "item");
    assert_eq!(Direction::In.opposite(), Direction::Out);
    assert_eq!(RunState::default(), RunState::Stopped);

    let topics = TopicBuilder::new("site", "");
    assert_eq!(topics.topic_for(EventType::Threshold), "site/threshold");
}

#[test]
fn test_state_from_default_config() {
    let config = SimulatorConfig::default();
    assert!(config.validate().is_ok());

    let state = SimulationState::new(config);
    assert_eq!(state.run_state(), RunState::Stopped);
    assert!(state.pool().is_none());
    assert_eq!(state.statistics(), &SimulationStatistics::default());
}

#[test]
fn test_error_conversions() {
    let error: SimulationError = ConfigValidationError::MissingUsername.into();
    assert_eq!(error.category(), "Configuration");

    let error: SimulationError = SinkError::Closed.into();
    assert_eq!(error.category(), "Publish");
}
