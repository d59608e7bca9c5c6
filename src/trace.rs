/*
 * Trace Module
 *
 * Breadcrumb left behind by a boid when tracing is switched on. It never
 * moves and never senses anything; it just counts down and asks to be
 * removed once its age drops below zero.
 */

use glam::DVec2;

use crate::agent::{Activation, AgentId};

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub id: AgentId,
    pub position: DVec2,
    pub age: i64,
}

impl Trace {
    pub fn new(id: AgentId, position: DVec2, initial_age: u32) -> Self {
        Self {
            id,
            position,
            age: i64::from(initial_age),
        }
    }

    pub fn step(&mut self) -> Activation {
        self.age -= 1;
        if self.age < 0 {
            Activation::Expired
        } else {
            Activation::Idle
        }
    }
}
