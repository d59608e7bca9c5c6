/*
 * Boid Flocking Simulation - Module Definitions
 *
 * Agents ("boids") move at constant speed over a bounded or toroidal plane,
 * turning a few degrees per tick to separate from, align with and cohere to
 * the boids they can see. This file wires the modules together and
 * re-exports the types a driver needs.
 */

// Re-export key components for easier access
pub use agent::{Activation, Agent, AgentId};
pub use boid::Boid;
pub use error::{ConfigError, FlockError, SpaceError};
pub use glam::{dvec2, DVec2};
pub use model::{AgentState, AgentStateKind, Flock, FlockSnapshot, FlockStats};
pub use params::FlockParams;
pub use schedule::RandomActivation;
pub use space::ContinuousSpace;
pub use trace::Trace;

// Define modules
pub mod agent;
pub mod batch;
pub mod boid;
pub mod error;
pub mod geometry;
pub mod model;
pub mod params;
pub mod schedule;
pub mod space;
pub mod trace;

#[cfg(feature = "viewer")]
pub mod viewer;
