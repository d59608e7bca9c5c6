/*
 * Agent Module
 *
 * Identity and the closed set of agent kinds that share the scheduler and
 * the space. Boids sense and steer; traces only age.
 */

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::boid::Boid;
use crate::trace::Trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// What an activation asks the model to do once the agent has run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Idle,
    LeaveTrace(DVec2),
    Expired,
}

#[derive(Debug, Clone)]
pub enum Agent {
    Boid(Boid),
    Trace(Trace),
}

impl Agent {
    pub fn id(&self) -> AgentId {
        match self {
            Agent::Boid(boid) => boid.id,
            Agent::Trace(trace) => trace.id,
        }
    }

    // Cached copy; the space holds the authoritative position
    pub fn position(&self) -> DVec2 {
        match self {
            Agent::Boid(boid) => boid.position,
            Agent::Trace(trace) => trace.position,
        }
    }

    pub fn as_boid(&self) -> Option<&Boid> {
        match self {
            Agent::Boid(boid) => Some(boid),
            Agent::Trace(_) => None,
        }
    }

    pub fn as_trace(&self) -> Option<&Trace> {
        match self {
            Agent::Trace(trace) => Some(trace),
            Agent::Boid(_) => None,
        }
    }
}
