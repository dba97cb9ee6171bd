//! Per-tick systems and the context they run against

pub mod ai;
pub mod collision;
pub mod context;
pub mod control;
pub mod events;
pub mod physics;
pub mod steering;
pub mod tick;

pub use context::Simulation;
pub use control::PlayerInput;
pub use events::{Cue, DefeatCause, SimulationEvent, TickReport};
pub use tick::run_simulation_tick;
