use crate::config::Config;
use crate::counters::Counters;
use crate::event::{Event, EventHook};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::sleep;

/// Index of an agent in its population, stable for the agent's lifetime.
pub type AgentId = usize;

/// Immutable planar coordinates assigned to an agent at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Health state of an agent.
///
/// Transitions only move forward along
/// Vulnerable → Exposed → Sick → {Immune, Dead}, with the seeded shortcuts
/// Vulnerable → Sick and Vulnerable → Immune.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Health {
    Vulnerable = 0,
    Exposed = 1,
    Sick = 2,
    Immune = 3,
    Dead = 4,
}

impl Health {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Health::Vulnerable,
            1 => Health::Exposed,
            2 => Health::Sick,
            3 => Health::Immune,
            _ => Health::Dead,
        }
    }
}

/// Message delivered through an agent's mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// The agent is one of the initially sick, seeded by the controller.
    InitialSick,
    /// A sick neighbor notified this agent of potential infection.
    Exposure,
    /// The agent is one of the initially immune, seeded by the controller.
    Immunity,
}

/// Disease course parameters, derived from the configuration once per run.
///
/// Durations are expressed in wall-clock time, already scaled by the
/// configured seconds per simulated day.
#[derive(Debug, Clone, Copy)]
pub struct Disease {
    pub incubation: Duration,
    pub sickness: Duration,
    pub recovery: Bernoulli,
}

impl Disease {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            incubation: Duration::from_secs_f64(cfg.incubation_days * cfg.seconds_per_day),
            sickness: Duration::from_secs_f64(cfg.sickness_days * cfg.seconds_per_day),
            recovery: Bernoulli::new(cfg.recover).context("invalid recovery probability")?,
        })
    }
}

/// State shared between an agent's task and the handles other tasks hold.
///
/// The health word is written only by the owning task; the running flag is
/// written by whoever stops the agent and read by the owning task between
/// suspensions.
#[derive(Debug)]
struct Shared {
    health: AtomicU8,
    running: AtomicBool,
    stopped: Notify,
}

impl Shared {
    fn new() -> Self {
        Self {
            health: AtomicU8::new(Health::Vulnerable as u8),
            running: AtomicBool::new(true),
            stopped: Notify::new(),
        }
    }

    fn health(&self) -> Health {
        Health::from_raw(self.health.load(Ordering::Acquire))
    }

    fn set_health(&self, health: Health) {
        self.health.store(health as u8, Ordering::Release);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Cloneable handle to a live agent.
///
/// Held by the controller, by neighboring agents and by presentation
/// collaborators. A handle can enqueue mailbox messages and read the agent's
/// position and current health, but never mutates agent state directly.
#[derive(Clone)]
pub struct AgentHandle {
    id: AgentId,
    position: Position,
    shared: Arc<Shared>,
    mailbox: UnboundedSender<Message>,
}

impl AgentHandle {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn health(&self) -> Health {
        self.shared.health()
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Ask the agent's control loop to exit at its next check.
    ///
    /// Advisory: an in-progress timed suspension is allowed to finish, but
    /// once the flag is observed the agent emits no further counter
    /// mutations or events.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.stopped.notify_one();
    }

    pub fn send_initial_sick(&self) {
        self.send(Message::InitialSick);
    }

    pub fn send_exposure(&self) {
        self.send(Message::Exposure);
    }

    pub fn send_immunity(&self) {
        self.send(Message::Immunity);
    }

    fn send(&self, message: Message) {
        // Fire-and-forget: a dropped mailbox means the agent is gone.
        let _ = self.mailbox.send(message);
    }
}

/// The task-owned side of an agent: mailbox receiver, state machine and
/// control loop.
pub struct Agent {
    id: AgentId,
    shared: Arc<Shared>,
    mailbox: UnboundedReceiver<Message>,
    neighbors: Vec<AgentHandle>,
    disease: Disease,
    counters: Arc<Counters>,
    events: EventHook,
    rng: ChaCha12Rng,
}

impl Agent {
    /// Create a new agent in state Vulnerable, not yet running.
    pub fn create(
        id: AgentId,
        position: Position,
        disease: Disease,
        counters: Arc<Counters>,
        events: EventHook,
        rng: ChaCha12Rng,
    ) -> (Agent, AgentHandle) {
        let shared = Arc::new(Shared::new());
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = AgentHandle {
            id,
            position,
            shared: Arc::clone(&shared),
            mailbox: sender,
        };
        let agent = Agent {
            id,
            shared,
            mailbox: receiver,
            neighbors: Vec::new(),
            disease,
            counters,
            events,
            rng,
        };

        (agent, handle)
    }

    /// Append a neighbor to this agent's list.
    ///
    /// Must complete before [`Agent::spawn`]: the list is read without
    /// synchronization once the control loop starts.
    pub fn add_neighbor(&mut self, neighbor: AgentHandle) {
        debug_assert_ne!(neighbor.id(), self.id, "agent must not neighbor itself");
        self.neighbors.push(neighbor);
    }

    /// Start the agent's independent control loop on the current runtime.
    pub fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        while self.shared.is_running() {
            let message = tokio::select! {
                received = self.mailbox.recv() => match received {
                    Some(message) => message,
                    // Every sender is gone; nothing can reach this agent.
                    None => break,
                },
                // Woken by stop() while parked on an empty mailbox; the
                // loop condition re-checks the flag.
                _ = self.shared.stopped.notified() => continue,
            };

            self.handle_message(message);

            if self.shared.health() == Health::Exposed {
                self.incubate().await;
            }
            if self.shared.health() == Health::Sick {
                self.transmit_and_resolve().await;
            }
        }
    }

    fn handle_message(&mut self, message: Message) {
        match message {
            Message::InitialSick => {
                if self.shared.is_running() && self.shared.health() == Health::Vulnerable {
                    self.shared.set_health(Health::Sick);
                    self.counters.dec_vulnerable();
                    self.counters.inc_sick();
                    (self.events)(Event::SickAtStart { agent: self.id });
                }
            }
            Message::Exposure => {
                // Duplicate exposures and exposures of immune, sick or dead
                // agents are no-ops.
                if self.shared.health() == Health::Vulnerable {
                    self.shared.set_health(Health::Exposed);
                }
            }
            Message::Immunity => {
                if matches!(self.shared.health(), Health::Vulnerable | Health::Exposed) {
                    self.shared.set_health(Health::Immune);
                    self.counters.dec_vulnerable();
                    self.counters.inc_immune();
                }
            }
        }
    }

    /// Wait out the incubation period, then fall sick if still running.
    async fn incubate(&mut self) {
        sleep(self.disease.incubation).await;

        if self.shared.is_running() {
            self.shared.set_health(Health::Sick);
            self.counters.dec_vulnerable();
            self.counters.inc_sick();
            (self.events)(Event::FellSick {
                agent: self.id,
                day: self.counters.day(),
            });
        }
    }

    /// Expose every still-running neighbor, wait out the sickness period,
    /// then resolve to Immune or Dead by one draw of the recovery chance.
    async fn transmit_and_resolve(&mut self) {
        if !self.shared.is_running() {
            return;
        }

        for neighbor in &self.neighbors {
            if neighbor.is_running() {
                neighbor.send_exposure();
            }
        }

        sleep(self.disease.sickness).await;

        if !self.shared.is_running() {
            return;
        }

        if self.disease.recovery.sample(&mut self.rng) {
            self.shared.set_health(Health::Immune);
            self.counters.dec_sick();
            self.counters.inc_immune();
            (self.events)(Event::Recovered {
                agent: self.id,
                day: self.counters.day(),
            });
        } else {
            self.shared.set_health(Health::Dead);
            self.counters.dec_sick();
            self.counters.inc_dead();
            (self.events)(Event::Died {
                agent: self.id,
                day: self.counters.day(),
            });
        }
    }
}
