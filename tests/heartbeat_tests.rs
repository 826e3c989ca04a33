//! Tests for heartbeat eligibility and initial report spreading

use rand::rngs::StdRng;
use rand::SeedableRng;
use rfid_tag_simulator::simulation::{HeartbeatTracker, IdentifierPool};
use rfid_tag_simulator::types::Epc;
use std::time::Duration;
use tokio::time::Instant;

fn pool(size: usize, seed: u64) -> IdentifierPool {
    IdentifierPool::populate(&[], size, &mut StdRng::seed_from_u64(seed))
}

/// After a report at t with duration d the tag is ineligible before t+d and eligible from t+d
#[test]
fn test_eligibility_follows_last_report() {
    let tag = Epc::parse("AA11").unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let start = Instant::now();
    let duration = Duration::from_millis(2500);

    let mut tracker = HeartbeatTracker::new();
    tracker.initialize([&tag], duration, start, &mut rng);

    let reported_at = start + Duration::from_millis(4000);
    tracker.mark_reported(&tag, reported_at, duration);

    for offset_ms in [0, 1, 1000, 2499] {
        assert!(!tracker.is_eligible(&tag, reported_at + Duration::from_millis(offset_ms)));
    }
    for offset_ms in [2500, 2501, 10_000] {
        assert!(tracker.is_eligible(&tag, reported_at + Duration::from_millis(offset_ms)));
    }
}

/// Every pooled tag gets exactly one entry, inside [now, now + duration)
#[test]
fn test_initial_entries_lie_in_window() {
    let pool = pool(500, 2);
    let mut rng = StdRng::seed_from_u64(3);
    let now = Instant::now();
    let duration = Duration::from_millis(1000);

    let mut tracker = HeartbeatTracker::new();
    tracker.initialize(pool.iter(), duration, now, &mut rng);

    assert_eq!(tracker.len(), pool.len());
    for epc in pool.iter() {
        let next = tracker.next_eligible(epc).unwrap();
        assert!(next >= now);
        assert!(next < now + duration);
    }
}

/// Initial entries spread roughly evenly over the window
#[test]
fn test_initial_entries_are_roughly_uniform() {
    const TAGS: usize = 10_000;
    let pool = pool(TAGS, 4);
    let mut rng = StdRng::seed_from_u64(5);
    let now = Instant::now();
    let duration = Duration::from_millis(1000);

    let mut tracker = HeartbeatTracker::new();
    tracker.initialize(pool.iter(), duration, now, &mut rng);

    let mut quartiles = [0usize; 4];
    for epc in pool.iter() {
        let offset = tracker.next_eligible(epc).unwrap() - now;
        let bucket = (offset.as_millis() / 250) as usize;
        quartiles[bucket] += 1;
    }

    for count in quartiles {
        let share = count as f64 / TAGS as f64;
        assert!((0.20..=0.30).contains(&share), "quartile share {} out of range", share);
    }
}

/// Tags outside the pool are never eligible and are not added by reporting
#[test]
fn test_unknown_tags_are_ignored() {
    let pool = pool(3, 6);
    let stranger = Epc::parse("FFFF").unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let now = Instant::now();

    let mut tracker = HeartbeatTracker::new();
    tracker.initialize(pool.iter(), Duration::from_secs(1), now, &mut rng);
    tracker.mark_reported(&stranger, now, Duration::from_secs(1));

    assert!(!tracker.is_eligible(&stranger, now + Duration::from_secs(60)));
    assert_eq!(tracker.len(), 3);
}
