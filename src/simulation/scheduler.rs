//! Scheduler loop
//!
//! A [`Simulator`] runs its [`SimulationState`] on a dedicated tokio task, the
//! driver. The driver is the only owner of the state and the live sink; it
//! selects over three sources:
//!
//! - commands from [`SimulatorHandle`]s (start, stop, shutdown)
//! - results of connection attempts, tagged with the start they belong to
//! - the single pending tick timer
//!
//! A tick runs to completion before the next one is scheduled, so ticks never
//! overlap and no locking is needed.

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant, Sleep};
use tracing::{debug, error, info, warn};

use crate::simulation::{SimulationError, SimulationResult, SimulationState, SimulationStatistics};
use crate::sink::{BrokerConnector, BrokerEndpoint, SinkError};
use crate::types::{RunState, SimulatorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Shutdown,
}

type ConnectionResult<S> = (u64, Result<S, SinkError>);

/// Cloneable control handle for a running [`Simulator`]
#[derive(Debug, Clone)]
pub struct SimulatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<RunState>,
}

impl SimulatorHandle {
    /// Ask the simulator to start; a no-op unless it is stopped
    pub fn start(&self) -> SimulationResult<()> {
        self.send(Command::Start)
    }

    /// Ask the simulator to stop; safe in any state
    pub fn stop(&self) -> SimulationResult<()> {
        self.send(Command::Stop)
    }

    /// Last run state published by the driver
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Wait until the driver reports `target`
    pub async fn wait_for_state(&self, target: RunState) -> SimulationResult<()> {
        let mut state = self.state.clone();
        let reached = state.wait_for(|current| *current == target).await.is_ok();
        if reached {
            Ok(())
        } else {
            Err(SimulationError::scheduler_error("simulator task has exited"))
        }
    }

    fn send(&self, command: Command) -> SimulationResult<()> {
        self.commands
            .send(command)
            .map_err(|_| SimulationError::scheduler_error("simulator task has exited"))
    }
}

/// A simulation running on its own task
///
/// # Example
///
/// ```rust,no_run
/// use rfid_tag_simulator::simulation::Simulator;
/// use rfid_tag_simulator::sink::StdoutConnector;
/// use rfid_tag_simulator::types::SimulatorConfig;
///
/// # async fn run() -> rfid_tag_simulator::simulation::SimulationResult<()> {
/// let simulator = Simulator::spawn(SimulatorConfig::default(), StdoutConnector::new());
/// simulator.start()?;
/// tokio::time::sleep(std::time::Duration::from_secs(5)).await;
/// let statistics = simulator.shutdown().await?;
/// println!("{}", statistics);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Simulator {
    handle: SimulatorHandle,
    task: JoinHandle<SimulationStatistics>,
}

impl Simulator {
    /// Spawn the driver for `config`; the simulation starts out stopped
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<C: BrokerConnector>(config: SimulatorConfig, connector: C) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(RunState::Stopped);
        let (connections_tx, connections_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            endpoint: Arc::new(BrokerEndpoint::from_config(&config.mqtt)),
            interval: config.reporting_interval_duration(),
            state: SimulationState::new(config),
            connector: Arc::new(connector),
            commands: commands_rx,
            connections_tx,
            connections: connections_rx,
            state_tx,
            attempt: 0,
            pending_connect: None,
            sink: None,
            next_tick: None,
        };

        Self {
            handle: SimulatorHandle { commands: commands_tx, state: state_rx },
            task: tokio::spawn(driver.run()),
        }
    }

    /// Ask the simulator to start
    pub fn start(&self) -> SimulationResult<()> {
        self.handle.start()
    }

    /// Ask the simulator to stop
    pub fn stop(&self) -> SimulationResult<()> {
        self.handle.stop()
    }

    /// Last published run state
    pub fn state(&self) -> RunState {
        self.handle.state()
    }

    /// A handle for controlling the simulator from elsewhere
    pub fn handle(&self) -> SimulatorHandle {
        self.handle.clone()
    }

    /// Stop the simulation, end the driver and return the final statistics
    pub async fn shutdown(self) -> SimulationResult<SimulationStatistics> {
        // The driver may already be gone; its statistics are still in the task
        let _ = self.handle.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| SimulationError::scheduler_error(format!("simulator task failed: {}", e)))
    }
}

struct Driver<C: BrokerConnector> {
    state: SimulationState,
    connector: Arc<C>,
    endpoint: Arc<BrokerEndpoint>,
    interval: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    connections_tx: mpsc::UnboundedSender<ConnectionResult<C::Sink>>,
    connections: mpsc::UnboundedReceiver<ConnectionResult<C::Sink>>,
    state_tx: watch::Sender<RunState>,
    /// Incremented on every accepted start; older connection results are stale
    attempt: u64,
    pending_connect: Option<JoinHandle<()>>,
    sink: Option<C::Sink>,
    next_tick: Option<Pin<Box<Sleep>>>,
}

impl<C: BrokerConnector> Driver<C> {
    async fn run(mut self) -> SimulationStatistics {
        debug!("Simulator driver started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Start) => self.handle_start(),
                    Some(Command::Stop) => self.handle_stop(),
                    Some(Command::Shutdown) | None => break,
                },
                Some((attempt, result)) = self.connections.recv() => {
                    self.handle_connection(attempt, result);
                }
                _ = wait_for_tick(&mut self.next_tick) => self.handle_tick(),
            }
        }

        self.handle_stop();
        debug!("Simulator driver finished");
        self.state.into_statistics()
    }

    fn handle_start(&mut self) {
        if !self.state.start(Instant::now()) {
            return;
        }
        self.publish_state();

        if let Some(export) = self.state.take_pending_export() {
            debug!("Saving {} identifiers to {}", export.pool.len(), export.path);
            tokio::task::spawn_blocking(move || {
                if let Err(e) = export.write() {
                    error!("{}", e);
                }
            });
        }

        self.attempt += 1;
        let attempt = self.attempt;
        let connector = Arc::clone(&self.connector);
        let endpoint = Arc::clone(&self.endpoint);
        let results = self.connections_tx.clone();

        info!("Connecting publish sink to {} (attempt {})", endpoint.url(), attempt);
        self.pending_connect = Some(tokio::spawn(async move {
            let result = connector.connect(&endpoint).await;
            let _ = results.send((attempt, result));
        }));
    }

    fn handle_connection(&mut self, attempt: u64, result: Result<C::Sink, SinkError>) {
        if attempt != self.attempt {
            debug!("Discarding connection result of stale attempt {}", attempt);
            return;
        }
        self.pending_connect = None;

        match result {
            Ok(sink) => {
                if !self.state.connection_established() {
                    return;
                }
                self.sink = Some(sink);
                self.schedule_tick();
                self.publish_state();
            }
            Err(e) => warn!("Publish sink connection failed: {}", e),
        }
    }

    fn handle_tick(&mut self) {
        self.next_tick = None;
        if !self.state.run_state().is_running() {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let report = self.state.tick(Instant::now(), sink);
        info!("Sent [ {} ] messages", report.messages_sent);
        self.schedule_tick();
    }

    fn handle_stop(&mut self) {
        if let Some(pending) = self.pending_connect.take() {
            pending.abort();
        }
        self.next_tick = None;
        self.sink = None;

        if self.state.stop() {
            info!("Simulation stopped");
            self.publish_state();
        }
    }

    fn schedule_tick(&mut self) {
        self.next_tick = Some(Box::pin(sleep(self.interval)));
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.state.run_state());
    }
}

/// Resolves when the pending tick is due; never resolves without one
async fn wait_for_tick(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}
