//! Tests for event generation and the published wire format

use rfid_tag_simulator::events::{EventGenerator, EventPayload, DEFAULT_ZONE, JOB_ID};
use rfid_tag_simulator::types::{Direction, Epc, EventType, ThresholdDescriptor};
use serde_json::Value;

fn epc() -> Epc {
    Epc::parse("AA11").unwrap()
}

fn zones() -> Vec<String> {
    vec!["A".to_string(), "B".to_string()]
}

fn thresholds() -> Vec<ThresholdDescriptor> {
    vec![ThresholdDescriptor::pair("IN_1", "OUT_1"), ThresholdDescriptor::named("DOCK_DOOR")]
}

/// Threshold crossings always go from one side to the other
#[test]
fn test_threshold_crossing_directions_differ() {
    let mut generator = EventGenerator::with_seed(zones(), thresholds(), 1);

    for _ in 0..200 {
        let crossing = generator.generate_threshold_crossing(&epc());
        assert_ne!(crossing.from_zone, crossing.to_zone);
        assert!(Direction::ALL.contains(&crossing.from_zone));
        assert!(thresholds().contains(crossing.threshold.as_ref().unwrap()));
    }
}

/// Item movements go from the absent zone into a configured zone
#[test]
fn test_item_movement_destination_in_zones() {
    let mut generator = EventGenerator::with_seed(zones(), Vec::new(), 2);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let movement = generator.generate_item_movement(&epc());
        assert_eq!(movement.from.zone, "ABSENT");
        assert!(zones().contains(&movement.to.zone));
        seen.insert(movement.to.zone);
    }
    assert_eq!(seen.len(), 2);
}

/// Without zones the destination falls back to the default zone
#[test]
fn test_item_movement_without_zones() {
    let mut generator = EventGenerator::with_seed(Vec::new(), Vec::new(), 3);
    assert_eq!(generator.generate_item_movement(&epc()).to.zone, DEFAULT_ZONE);
}

/// Without thresholds no threshold crossing is ever chosen
#[test]
fn test_no_thresholds_means_no_crossings() {
    let mut generator = EventGenerator::with_seed(zones(), Vec::new(), 4);

    for _ in 0..500 {
        assert_eq!(generator.generate(&epc()).event_type(), EventType::Item);
    }
}

/// With thresholds both event types occur, roughly half each
#[test]
fn test_coin_flip_mixes_event_types() {
    let mut generator = EventGenerator::with_seed(zones(), thresholds(), 5);

    let crossings = (0..2000)
        .filter(|_| generator.generate(&epc()).event_type() == EventType::Threshold)
        .count();

    assert!((800..=1200).contains(&crossings), "{} threshold events", crossings);
}

/// A crossing requested directly with no thresholds configured carries a null threshold
#[test]
fn test_crossing_without_thresholds_serializes_null() {
    let mut generator = EventGenerator::with_seed(zones(), Vec::new(), 6);
    let payload: EventPayload = generator.generate_threshold_crossing(&epc()).into();

    let json: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
    assert!(json["threshold"].is_null());
}

/// Item movement JSON matches the downstream format
#[test]
fn test_item_movement_wire_format() {
    let mut generator = EventGenerator::with_seed(vec!["A".to_string()], Vec::new(), 7);
    let payload = generator.generate(&epc());

    let json: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
    assert_eq!(json["epc"], "AA11");
    assert_eq!(json["tagId"], "");
    assert_eq!(json["jobId"], JOB_ID);
    assert_eq!(json["jobName"], "jobName");
    assert_eq!(json["from"]["zone"], "ABSENT");
    assert!(json["from"]["floor"].is_null());
    assert!(json["from"]["x"].is_null());
    assert_eq!(json["to"]["zone"], "A");
    assert_eq!(json["to"]["floor"], "1");
    assert_eq!(json["to"]["facility"], "DEFAULT");
    assert_eq!(json["to"]["x"], 0.0);

    let time = json["observationTime"].as_str().unwrap();
    assert!(time.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
}

/// Threshold crossing JSON matches the downstream format for both descriptor shapes
#[test]
fn test_threshold_crossing_wire_format() {
    let mut generator = EventGenerator::with_seed(Vec::new(), thresholds(), 8);

    let mut shapes = std::collections::HashSet::new();
    for _ in 0..100 {
        let payload: EventPayload = generator.generate_threshold_crossing(&epc()).into();
        let json: Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(json["thresholdId"], 1);
        assert_eq!(json["confidence"], 1.0);
        assert_eq!(json["jobName"], "threshold_job");
        assert_ne!(json["fromZone"], json["toZone"]);

        match &json["threshold"] {
            Value::Object(pair) => {
                assert_eq!(pair["in"], "IN_1");
                assert_eq!(pair["out"], "OUT_1");
                shapes.insert("pair");
            }
            Value::String(name) => {
                assert_eq!(name, "DOCK_DOOR");
                shapes.insert("named");
            }
            other => panic!("unexpected threshold {:?}", other),
        }
    }
    assert_eq!(shapes.len(), 2);
}
