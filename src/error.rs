/*
 * Error Module
 *
 * Error types for the flock simulation. Configuration problems are reported
 * before anything is built; space errors come from the continuous space
 * index. Geometry never errors: degenerate vectors are folded into the
 * special cases of the angle helpers instead.
 */

use thiserror::Error;

use crate::agent::AgentId;

/// Invalid construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("population must be at least one boid")]
    EmptyPopulation,
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be a non-negative finite number, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// Errors emitted by the continuous space.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("invalid space configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("position ({x}, {y}) lies outside the {width}x{height} space")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    #[error("agent {0} is not placed in the space")]
    UnknownAgent(AgentId),
    #[error("agent {0} is already placed in the space")]
    AlreadyPlaced(AgentId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Space(#[from] SpaceError),
    // Space and registry disagree; only a bookkeeping bug gets here.
    #[error("agent {0} is indexed in the space but missing from the registry")]
    Unregistered(AgentId),
}
