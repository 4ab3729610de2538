/*
Host side of the engine: an ordered command/event channel.

The engine knows nothing about running or pausing. `SimulationHost` holds an
optional engine plus a running flag; a timer tick runs `stepsPerUpdate`
steps and reports one aggregated `StateUpdate`. The loop itself is a tokio
task (`run_host`) that can be embedded in a caller's runtime or started on
its own OS thread with `spawn_worker`.

Wire shape (JSON):

    {"type": "INIT", "atoms": [...], "config": {...}}
    {"type": "UPDATE_CONFIG", "config": {"targetTemperature": 1200}}
    {"type": "STATE_UPDATE", "positions": [[x, y, z], ...], ...}
*/

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::{SimConfig, SimConfigUpdate};
use crate::elements::Element;
use crate::engine::{SimulationEngine, StepSnapshot};
use crate::error::{Result, SimError};
use crate::molecule::{Atom, Bond, Species};
use crate::vec3::to_array;

pub const DEFAULT_TICK: Duration = Duration::from_millis(33);
const CHANNEL_CAPACITY: usize = 64;
const THROUGHPUT_WINDOW: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Init { atoms: Vec<Atom>, config: SimConfig },
    Start,
    Stop,
    Step,
    UpdateConfig { config: SimConfigUpdate },
    Reset { atoms: Vec<Atom>, config: SimConfig },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub positions: Vec<[f64; 3]>,
    pub forces: Vec<[f64; 3]>,
    pub elements: Vec<Element>,
    pub bonds: Vec<Bond>,
    pub species: Vec<Species>,
    pub temperature: f64,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    pub step: u64,
    pub time: f64,
    pub steps_per_second: f64,
}

impl StateUpdate {
    pub fn from_snapshot(snapshot: StepSnapshot, steps_per_second: f64) -> Self {
        StateUpdate {
            positions: snapshot.atoms.iter().map(|a| to_array(&a.position)).collect(),
            forces: snapshot.atoms.iter().map(|a| to_array(&a.force)).collect(),
            elements: snapshot.atoms.iter().map(|a| a.element).collect(),
            bonds: snapshot.bonds,
            species: snapshot.species,
            temperature: snapshot.temperature,
            kinetic_energy: snapshot.kinetic_energy,
            potential_energy: snapshot.potential_energy,
            total_energy: snapshot.total_energy,
            step: snapshot.step,
            time: snapshot.time,
            steps_per_second,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    StateUpdate(StateUpdate),
    Ready,
    Error { message: String },
}

impl From<SimError> for Event {
    fn from(err: SimError) -> Self {
        Event::Error {
            message: err.to_string(),
        }
    }
}

/// Steps per second, measured over windows of at least one second.
#[derive(Clone, Debug)]
pub struct Throughput {
    window_start: Instant,
    steps: u64,
    rate: f64,
}

impl Throughput {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Throughput {
            window_start: now,
            steps: 0,
            rate: 0.0,
        }
    }

    pub fn record(&mut self, steps: u64) {
        self.record_at(steps, Instant::now());
    }

    pub fn record_at(&mut self, steps: u64, now: Instant) {
        self.steps += steps;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= THROUGHPUT_WINDOW {
            self.rate = self.steps as f64 / elapsed.as_secs_f64();
            self.steps = 0;
            self.window_start = now;
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for Throughput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct SimulationHost {
    engine: Option<SimulationEngine>,
    running: bool,
    throughput: Throughput,
}

impl SimulationHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn engine(&self) -> Option<&SimulationEngine> {
        self.engine.as_ref()
    }

    fn engine_mut(&mut self) -> Result<&mut SimulationEngine> {
        self.engine.as_mut().ok_or(SimError::NotInitialized)
    }

    fn state_update(&self, snapshot: StepSnapshot) -> Event {
        Event::StateUpdate(StateUpdate::from_snapshot(snapshot, self.throughput.rate()))
    }

    /// Build a fresh engine. A failed init leaves the previous engine in place.
    fn initialize(&mut self, atoms: Vec<Atom>, config: SimConfig) -> Result<Event> {
        let engine = SimulationEngine::init(atoms, config)?;
        let snapshot = engine.snapshot();
        self.engine = Some(engine);
        self.throughput = Throughput::new();
        Ok(self.state_update(snapshot))
    }

    /// Apply one command and return the events it produces, in order.
    pub fn handle(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::Init { atoms, config } => match self.initialize(atoms, config) {
                Ok(update) => vec![update, Event::Ready],
                Err(err) => vec![err.into()],
            },
            Command::Reset { atoms, config } => {
                self.running = false;
                match self.initialize(atoms, config) {
                    Ok(update) => vec![update],
                    Err(err) => vec![err.into()],
                }
            }
            Command::Start => {
                if self.engine.is_none() {
                    return vec![SimError::NotInitialized.into()];
                }
                self.running = true;
                self.throughput = Throughput::new();
                info!("run loop started");
                Vec::new()
            }
            Command::Stop => {
                if self.running {
                    info!("run loop stopped");
                }
                self.running = false;
                Vec::new()
            }
            Command::Step => match self.engine_mut() {
                Ok(engine) => {
                    let snapshot = engine.step();
                    vec![self.state_update(snapshot)]
                }
                Err(err) => vec![err.into()],
            },
            Command::UpdateConfig { config } => {
                match self.engine_mut().and_then(|engine| engine.update_config(&config)) {
                    Ok(()) => Vec::new(),
                    Err(err) => vec![err.into()],
                }
            }
        }
    }

    /// One timer tick: a batch of steps and a single aggregated update.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        let engine = self.engine.as_mut()?;
        let batch = engine.config().steps_per_update;
        let mut snapshot = None;
        for _ in 0..batch {
            snapshot = Some(engine.step());
        }
        self.throughput.record(batch as u64);
        snapshot.map(|s| self.state_update(s))
    }
}

/// Run the host until the command channel closes or the event receiver is dropped.
pub async fn run_host(mut commands: mpsc::Receiver<Command>, events: mpsc::Sender<Event>, tick: Duration) {
    let mut host = SimulationHost::new();
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("command channel closed, host exiting");
                    break;
                };
                for event in host.handle(command) {
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(event) = host.tick() {
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Synchronous handle to a host running on its own thread.
///
/// `send` and `recv` block, so they must not be called from inside an async
/// runtime.
pub struct WorkerHandle {
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<Event>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .blocking_send(command)
            .map_err(|_| SimError::WorkerClosed)
    }

    /// Next event, blocking. `None` once the worker has exited.
    pub fn recv(&mut self) -> Option<Event> {
        self.events.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Close the command channel and wait for the worker thread.
    pub fn shutdown(self) {
        let WorkerHandle {
            commands,
            events,
            thread,
        } = self;
        drop(commands);
        drop(events);
        if thread.join().is_err() {
            error!("simulation worker panicked");
        }
    }
}

/// Start a host on a dedicated OS thread with a current-thread tokio runtime.
pub fn spawn_worker(tick: Duration) -> Result<WorkerHandle> {
    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let thread = thread::Builder::new()
        .name("md-worker".to_string())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build();
            match runtime {
                Ok(runtime) => runtime.block_on(run_host(command_rx, event_tx, tick)),
                Err(err) => error!("failed to start worker runtime: {err}"),
            }
        })?;

    Ok(WorkerHandle {
        commands: command_tx,
        events: event_rx,
        thread,
    })
}
