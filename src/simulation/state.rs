//! Simulation state
//!
//! [`SimulationState`] owns everything a running simulation mutates: the
//! identifier pool, the heartbeat tracker, the event generator and the run
//! state. It is driven synchronously; timers and connections live in the
//! scheduler.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::events::EventGenerator;
use crate::simulation::{
    HeartbeatTracker, IdentifierPool, SimulationResult, SimulationStatistics, TickReport,
    TopicBuilder,
};
use crate::sink::PublishSink;
use crate::types::{RunState, SimulatorConfig};

/// An identifier list waiting to be written to disk
///
/// Produced by the first [`SimulationState::start`] when saving is enabled.
/// Writing is left to the caller so that file I/O stays off the scheduling task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolExport {
    /// Identifiers to write
    pub pool: IdentifierPool,
    /// Destination path
    pub path: String,
}

impl PoolExport {
    /// Write the identifiers, one per line; blocking
    pub fn write(&self) -> SimulationResult<()> {
        self.pool.persist(&self.path)
    }
}

/// State of one simulator, from configuration to per-tag heartbeats
#[derive(Debug)]
pub struct SimulationState {
    config: SimulatorConfig,
    pool: Option<IdentifierPool>,
    heartbeats: HeartbeatTracker,
    generator: EventGenerator,
    topics: TopicBuilder,
    run_state: RunState,
    rng: StdRng,
    statistics: SimulationStatistics,
    pending_export: Option<PoolExport>,
}

impl SimulationState {
    /// Create a stopped simulation for an already validated configuration
    ///
    /// With `seed` set, the identifier pool, heartbeat offsets and event
    /// choices are reproducible.
    pub fn new(config: SimulatorConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let generator = EventGenerator::from_config(&config, StdRng::seed_from_u64(rng.gen()));
        let topics = TopicBuilder::from_config(&config.mqtt);

        Self {
            config,
            pool: None,
            heartbeats: HeartbeatTracker::new(),
            generator,
            topics,
            run_state: RunState::Stopped,
            rng,
            statistics: SimulationStatistics::new(),
            pending_export: None,
        }
    }

    /// Leave `Stopped` and begin connecting
    ///
    /// The identifier pool is built on the first start only; when saving is
    /// enabled that start also queues a [`PoolExport`] for
    /// [`take_pending_export`](Self::take_pending_export). Heartbeats are
    /// re-seeded on every start. Returns `false` without side effects when
    /// not stopped.
    #[instrument(skip(self), fields(state = %self.run_state))]
    pub fn start(&mut self, now: Instant) -> bool {
        if self.run_state != RunState::Stopped {
            debug!("Ignoring start while {}", self.run_state);
            return false;
        }
        self.run_state = RunState::Connecting;

        if self.pool.is_none() {
            let pool = IdentifierPool::populate(
                &self.config.epcs.explicit,
                self.config.epcs.total,
                &mut self.rng,
            );
            if self.config.epcs.save && !pool.is_empty() {
                self.pending_export =
                    Some(PoolExport { pool: pool.clone(), path: self.config.epcs.output.clone() });
            }
            self.statistics.identifiers = pool.len();
            self.pool = Some(pool);
        }

        if let Some(pool) = &self.pool {
            self.heartbeats.initialize(
                pool.iter(),
                self.config.heartbeat_duration(),
                now,
                &mut self.rng,
            );
        }

        info!("Simulation connecting with {} identifiers", self.statistics.identifiers);
        true
    }

    /// Move from `Connecting` to `Running` once the sink is connected
    ///
    /// Returns `false` when the simulation was stopped in the meantime.
    pub fn connection_established(&mut self) -> bool {
        if self.run_state != RunState::Connecting {
            debug!("Ignoring connection while {}", self.run_state);
            return false;
        }
        self.run_state = RunState::Running;
        self.statistics.record_run_started(Utc::now());
        info!("Simulation running");
        true
    }

    /// Stop the simulation; returns whether the state changed
    pub fn stop(&mut self) -> bool {
        if self.run_state == RunState::Stopped {
            return false;
        }
        debug!("Stopping simulation from {}", self.run_state);
        self.run_state = RunState::Stopped;
        self.statistics.record_stopped(Utc::now());
        true
    }

    /// Run one tick: every eligible tag reports once, in pool order
    ///
    /// Does nothing unless running. Publish failures are logged and counted;
    /// they never end the tick early.
    #[instrument(skip(self, sink))]
    pub fn tick<S: PublishSink + ?Sized>(&mut self, now: Instant, sink: &mut S) -> TickReport {
        let mut report = TickReport::default();
        if !self.run_state.is_running() {
            return report;
        }
        let Some(pool) = &self.pool else {
            return report;
        };

        let heartbeat = self.config.heartbeat_duration();
        for epc in pool.iter() {
            if !self.heartbeats.is_eligible(epc, now) {
                continue;
            }
            self.heartbeats.mark_reported(epc, now, heartbeat);

            let payload = self.generator.generate(epc);
            let event_type = payload.event_type();
            let json = match payload.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!(epc = %epc, "Skipping event that failed to serialize: {}", e);
                    continue;
                }
            };

            let topic = self.topics.topic_for(event_type);
            match sink.publish(&topic, &json) {
                Ok(()) => report.record_sent(event_type),
                Err(e) => {
                    warn!(epc = %epc, topic = %topic, "Publish failed: {}", e);
                    report.record_failure();
                }
            }
        }

        self.statistics.record_tick(&report);
        report
    }

    /// Hand over the identifier list queued for saving, at most once
    pub fn take_pending_export(&mut self) -> Option<PoolExport> {
        self.pending_export.take()
    }

    /// Current run state
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Configuration the simulation was built from
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Identifier pool, once the first start has built it
    pub fn pool(&self) -> Option<&IdentifierPool> {
        self.pool.as_ref()
    }

    /// Heartbeat tracker
    pub fn heartbeats(&self) -> &HeartbeatTracker {
        &self.heartbeats
    }

    /// Topic builder
    pub fn topics(&self) -> &TopicBuilder {
        &self.topics
    }

    /// Statistics so far
    pub fn statistics(&self) -> &SimulationStatistics {
        &self.statistics
    }

    /// Consume the state, returning its statistics
    pub fn into_statistics(self) -> SimulationStatistics {
        self.statistics
    }
}
