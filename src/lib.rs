//! Concurrent agent-based simulation of a contagious disease.
//!
//! Each agent of a population runs as its own task with a private mailbox,
//! reacting to exposure signals from its spatial neighbors and evolving
//! through incubation and sickness by probabilistic and timed rules. The
//! [`Engine`] builds the population and topology for one of three layouts
//! and aggregates per-agent transitions into the shared [`Counters`].

pub mod agent;
pub mod config;
pub mod counters;
pub mod engine;
pub mod event;
pub mod layout;
pub mod topology;

pub use agent::{Agent, AgentHandle, AgentId, Disease, Health, Message, Position};
pub use config::{Config, Layout};
pub use counters::{Counters, Snapshot};
pub use engine::Engine;
pub use event::{Event, EventHook};
pub use layout::Placement;
