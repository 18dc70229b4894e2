use crate::agent::AgentId;
use std::fmt;
use std::sync::Arc;

/// Reportable change in an agent's trajectory.
///
/// The `Display` form is the human-readable line shown in an event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SickAtStart { agent: AgentId },
    FellSick { agent: AgentId, day: usize },
    Recovered { agent: AgentId, day: usize },
    Died { agent: AgentId, day: usize },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Event::SickAtStart { agent } => {
                write!(f, "Agent {agent} was sick at the start")
            }
            Event::FellSick { agent, day } => {
                write!(f, "Agent {agent} got sick on day {day}")
            }
            Event::Recovered { agent, day } => {
                write!(f, "Agent {agent} recovered on day {day}")
            }
            Event::Died { agent, day } => {
                write!(f, "Agent {agent} died on day {day}")
            }
        }
    }
}

/// Callback invoked by agent tasks whenever a reportable event occurs.
///
/// Called from many tasks concurrently; implementations must be cheap and
/// non-blocking since they run inline in the agent control loops.
pub type EventHook = Arc<dyn Fn(Event) + Send + Sync>;
