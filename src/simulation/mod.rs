//! Simulation engine and control
//!
//! This module contains the tag population, heartbeat scheduling, the
//! simulation state machine and the scheduler task that drives it.
//!
//! # Overview
//!
//! - **IdentifierPool**: configured EPCs plus generated ones up to the target total
//! - **HeartbeatTracker**: when each tag may report next
//! - **SimulationState**: the Stopped / Connecting / Running state machine and the tick body
//! - **Simulator**: the driver task with its timer and sink connection
//! - **SimulationStatistics**: per-tick and cumulative counters
//! - **SimulationError**: error handling for simulation operations
//!
//! # Usage Example
//!
//! ```rust
//! use rfid_tag_simulator::simulation::*;
//! use rfid_tag_simulator::types::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::time::Duration;
//! use tokio::time::Instant;
//!
//! let explicit = vec![Epc::parse("AA11").unwrap()];
//! let mut rng = StdRng::seed_from_u64(1);
//! let pool = IdentifierPool::populate(&explicit, 3, &mut rng);
//! assert_eq!(pool.len(), 3);
//!
//! let now = Instant::now();
//! let heartbeat = Duration::from_secs(1);
//! let mut heartbeats = HeartbeatTracker::new();
//! heartbeats.initialize(pool.iter(), heartbeat, now, &mut rng);
//! assert!(heartbeats.is_eligible(&explicit[0], now + heartbeat));
//! ```

pub mod error;
pub mod heartbeat;
pub mod identifier_pool;
pub mod logging;
pub mod scheduler;
pub mod state;
pub mod statistics;
pub mod topic;

// Re-export all public types for convenience
pub use error::*;
pub use heartbeat::*;
pub use identifier_pool::*;
pub use logging::*;
pub use scheduler::*;
pub use state::*;
pub use statistics::*;
pub use topic::*;
