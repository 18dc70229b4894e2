use crate::agent::{Agent, AgentHandle, Disease};
use crate::config::Config;
use crate::counters::Counters;
use crate::event::EventHook;
use crate::layout;
use crate::topology;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use std::sync::Arc;

/// Simulation controller.
///
/// Owns the configuration, the shared counters, the master random number
/// generator and the handles of the currently running agent generation, and
/// orchestrates start, stop and restart of a run.
pub struct Engine {
    cfg: Config,
    counters: Arc<Counters>,
    events: EventHook,
    rng: ChaCha12Rng,
    agents: Vec<AgentHandle>,
}

impl Engine {
    /// Create a new `Engine` with the given configuration and event hook.
    ///
    /// The master RNG is seeded from the configuration's `seed` when one is
    /// given, otherwise from the operating system.
    pub fn new(cfg: Config, events: EventHook) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        Ok(Self {
            cfg,
            counters: Arc::new(Counters::new()),
            events,
            rng,
            agents: Vec::new(),
        })
    }

    /// Build and start a fresh population.
    ///
    /// Places the agents, computes the neighbor topology, wires every
    /// neighbor list before any control loop starts, spawns one task per
    /// agent and finally sends the immune seeds followed by the sick seeds.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        let placement = layout::place(&self.cfg, &mut self.rng).context("failed to place agents")?;
        let n_agents = placement.positions.len();

        self.counters.reset(n_agents);

        let disease = Disease::from_config(&self.cfg).context("failed to derive disease course")?;

        let mut agents = Vec::with_capacity(n_agents);
        let mut handles = Vec::with_capacity(n_agents);
        for (id, &position) in placement.positions.iter().enumerate() {
            let rng = ChaCha12Rng::from_rng(&mut self.rng);
            let (agent, handle) = Agent::create(
                id,
                position,
                disease,
                Arc::clone(&self.counters),
                Arc::clone(&self.events),
                rng,
            );
            agents.push(agent);
            handles.push(handle);
        }

        let adjacency = topology::neighbor_indices(
            &placement.positions,
            self.cfg.exposure_distance,
            self.cfg.layout.inclusive_exposure(),
        );
        for (agent, neighbors) in agents.iter_mut().zip(&adjacency) {
            for &neighbor in neighbors {
                agent.add_neighbor(handles[neighbor].clone());
            }
        }

        for agent in agents {
            agent.spawn();
        }

        // Immune seeding first: an agent marked immune must never also
        // receive the initial-sick message.
        for &idx in &placement.initial_immune {
            handles[idx].send_immunity();
        }
        for &idx in &placement.initial_sick {
            handles[idx].send_initial_sick();
        }

        log::info!("started {n_agents} agents with layout {:?}", self.cfg.layout);

        self.agents = handles;

        Ok(())
    }

    /// Signal every agent of the current generation to stop.
    ///
    /// Cooperative: agents exit at their next flag check and in-progress
    /// timed waits are allowed to finish, after which the stopped agents
    /// emit nothing further.
    pub fn stop(&self) {
        for agent in &self.agents {
            agent.stop();
        }
    }

    /// Stop the current generation and rebuild the population from scratch.
    ///
    /// The old tasks are only asked to stop, not joined; the running-flag
    /// guards in the agent loops make any late-finishing old-generation work
    /// a safe no-op. Counters are reset to the initial configuration values
    /// and the day clock to zero.
    pub fn restart(&mut self) -> Result<()> {
        self.stop();
        self.agents.clear();
        self.start()
    }

    /// Advance the day clock by one tick.
    pub fn advance_day(&self) {
        self.counters.advance_day();
    }

    /// Shared counters, for periodic snapshotting by a presentation layer.
    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    /// Handles of the currently running agent generation.
    pub fn agents(&self) -> &[AgentHandle] {
        &self.agents
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
